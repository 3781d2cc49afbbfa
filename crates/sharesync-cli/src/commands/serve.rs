use crate::config::Config;
use anyhow::{Context, Result};
use sharesync_core::{
    AuthorizationFlow, BreadthCaps, GraphSourceProvider, IdentityClient, InMemoryCredentialStore,
    IndexingOrchestrator, JobRegistry, KnowledgeBaseClient,
};
use sharesync_gateway::{start_server, AppState, AuthRedirects};
use std::sync::Arc;
use tracing::info;

pub async fn execute(host: Option<String>, port: Option<u16>, config: Config) -> Result<()> {
    let identity = config
        .identity
        .context("[identity] section is required to serve")?;
    identity.validate().context("Invalid [identity] config")?;
    let knowledge_base = config
        .knowledge_base
        .context("[knowledge_base] section is required to serve")?;
    knowledge_base
        .validate()
        .context("Invalid [knowledge_base] config")?;

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    info!(host = %host, port, tenant = %identity.tenant_id, "Starting gateway server");

    let source = Arc::new(GraphSourceProvider::new(&config.source)?);
    let sink = Arc::new(KnowledgeBaseClient::new(&knowledge_base)?);
    let orchestrator = IndexingOrchestrator::new(Arc::new(JobRegistry::new()))
        .with_caps(BreadthCaps::from(&config.indexing));
    let auth = AuthorizationFlow::new(
        IdentityClient::new(identity)?,
        Arc::new(InMemoryCredentialStore::new()),
    );

    let mut state = AppState::new(source, sink, orchestrator, auth);
    state.redirects = AuthRedirects {
        success: config.auth.success_redirect,
        error: config.auth.error_redirect,
    };
    state.allowed_origins = config.server.allowed_origins;

    start_server(state, &host, port).await?;

    Ok(())
}
