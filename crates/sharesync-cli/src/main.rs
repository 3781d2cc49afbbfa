mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    sharesync_core::init_logging();

    let cli = Cli::parse();

    // Init doesn't need a config
    if let Commands::Init { path } = &cli.command {
        return commands::init::run_init(path);
    }

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Serve { host, port } => {
            commands::serve::execute(host, port, config).await?;
        }
        Commands::Index {
            access_token,
            content_types,
            sync_type,
            search_depth,
        } => {
            let args = commands::index::IndexArgs {
                access_token,
                content_types,
                sync_type,
                search_depth,
            };
            commands::index::execute(args, &config).await?;
        }
    }

    Ok(())
}
