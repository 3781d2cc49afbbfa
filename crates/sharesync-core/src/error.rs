//! Error taxonomy shared by the connectors, the orchestrator and the OAuth flow.
//!
//! The gateway maps each variant onto an HTTP status at the request boundary;
//! nothing in this crate retries.

/// Top-level error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Missing or invalid authorization code, provider `error` parameter,
    /// or an operation attempted from the wrong authorization state.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// The identity provider's token endpoint answered with a non-2xx status.
    #[error("token request failed ({status}): {message}")]
    TokenExchange { status: u16, message: String },

    /// A source or sink connector call answered with a non-2xx status.
    #[error("API request failed ({status}): {message}")]
    UpstreamRequest { status: u16, message: String },

    /// A required request field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// Connection-level failure before any HTTP status was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// Configuration loading or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// An indexing pass aborted; no job record was produced.
    #[error("indexing failed: {0}")]
    IndexingFailed(#[source] Box<SyncError>),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a connector failure as the cause of an aborted indexing pass.
    pub fn indexing_failed(cause: SyncError) -> Self {
        Self::IndexingFailed(Box::new(cause))
    }

    /// HTTP status reported by the upstream service, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamRequest { status, .. } | Self::TokenExchange { status, .. } => {
                Some(*status)
            }
            Self::IndexingFailed(cause) => cause.upstream_status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_failed_keeps_cause() {
        let err = SyncError::indexing_failed(SyncError::UpstreamRequest {
            status: 403,
            message: "Access denied".into(),
        });
        assert_eq!(err.upstream_status(), Some(403));
        assert_eq!(
            err.to_string(),
            "indexing failed: API request failed (403): Access denied"
        );
    }
}
