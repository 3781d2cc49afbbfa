pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod oauth;
pub mod orchestrator;
pub mod registry;
pub mod sink;
pub mod source;

pub use config::{IdentityConfig, IndexingConfig, KnowledgeBaseConfig, Secret, SourceConfig};
pub use error::{Result, SyncError};
pub use models::{
    ContentType, IndexedItem, IndexingJob, ItemKind, JobStatus, PermissionJob, SyncJob, SyncType,
};
pub use oauth::{
    AuthState, AuthorizationFlow, AuthorizationMarker, CallbackParams, CredentialStore, FlowKind,
    IdentityClient, InMemoryCredentialStore, TokenResponse,
};
pub use orchestrator::{BreadthCaps, IndexingOrchestrator, IndexingOutcome, IndexingRequest};
pub use registry::{JobRecord, JobRegistry};
pub use sink::{Ack, KnowledgeBaseClient, KnowledgeHit, SinkConnector};
pub use source::{GraphClient, GraphSourceProvider, SourceConnector, SourceProvider};

/// Initialize structured JSON logging. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().json().with_env_filter(filter).init();
}
