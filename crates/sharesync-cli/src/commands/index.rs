use crate::config::Config;
use anyhow::{Context, Result};
use sharesync_core::{
    BreadthCaps, ContentType, GraphSourceProvider, IndexingOrchestrator, IndexingRequest,
    JobRegistry, SourceProvider, SyncType,
};
use std::sync::Arc;

pub struct IndexArgs {
    pub access_token: String,
    pub content_types: Vec<ContentType>,
    pub sync_type: SyncType,
    pub search_depth: u32,
}

impl IndexArgs {
    fn into_request(self) -> IndexingRequest {
        let content_types = if self.content_types.is_empty() {
            ContentType::ALL.to_vec()
        } else {
            self.content_types
        };
        IndexingRequest {
            content_types,
            sync_type: self.sync_type,
            search_depth: self.search_depth,
        }
    }
}

/// Run one pass against the configured source and print the outcome.
pub async fn execute(args: IndexArgs, config: &Config) -> Result<()> {
    if args.access_token.is_empty() {
        anyhow::bail!("Access token is required");
    }

    let provider = GraphSourceProvider::new(&config.source)?;
    let source = provider.connect(&args.access_token)?;
    let orchestrator = IndexingOrchestrator::new(Arc::new(JobRegistry::new()))
        .with_caps(BreadthCaps::from(&config.indexing));

    let outcome = orchestrator
        .run_indexing_pass(source.as_ref(), args.into_request())
        .await
        .context("Indexing pass failed")?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
