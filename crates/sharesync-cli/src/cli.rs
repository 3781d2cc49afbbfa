use clap::{Parser, Subcommand};
use sharesync_core::orchestrator::DEFAULT_SEARCH_DEPTH;
use sharesync_core::{ContentType, SyncType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sharesync")]
#[command(about = "ShareSync - SharePoint to knowledge-base sync gateway", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (defaults to ./sharesync.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a template config file
    Init {
        /// Path for new config file
        #[arg(default_value = crate::config::DEFAULT_CONFIG_PATH)]
        path: PathBuf,
    },
    /// Start the HTTP gateway server
    Serve {
        /// Host to bind to (overrides [server].host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides [server].port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one indexing pass and print the outcome as JSON
    Index {
        /// Bearer token for the content source
        #[arg(long, env = "SHARESYNC_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
        /// Content types to cover, comma separated (default: all)
        #[arg(long, value_delimiter = ',')]
        content_types: Vec<ContentType>,
        /// once | regular
        #[arg(long, default_value = "regular")]
        sync_type: SyncType,
        #[arg(long, default_value_t = DEFAULT_SEARCH_DEPTH)]
        search_depth: u32,
    },
}
