//! Authorization flow against the Microsoft identity platform.
//!
//! ```text
//!   none ──begin──▶ in-progress ──token──▶ complete
//!    ▲                  │                     │
//!    └──── failure ─────┘◀──── disconnect ────┘
//! ```
//!
//! Access tokens are never stored: `complete` only keeps an
//! [`AuthorizationMarker`] in the injected [`CredentialStore`].

pub mod identity;

pub use identity::{IdentityClient, TokenResponse, APP_SCOPE, DELEGATED_SCOPES};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{Result, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    /// Authorization-code flow on behalf of a user.
    Delegated,
    /// Client-credentials flow acting as the application.
    App,
}

/// What survives a completed authorization. Holds no token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationMarker {
    pub flow: FlowKind,
    pub tenant_id: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub authorized_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum AuthState {
    #[default]
    None,
    InProgress {
        flow: FlowKind,
        #[serde(skip)]
        nonce: Option<String>,
    },
    Complete(AuthorizationMarker),
}

impl AuthState {
    pub fn is_complete(&self) -> bool {
        matches!(self, AuthState::Complete(_))
    }
}

/// Where the authorization state lives between requests.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> AuthState;

    async fn save(&self, state: AuthState);
}

/// Process-local store; state is lost on restart.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    state: RwLock<AuthState>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> AuthState {
        self.state.read().await.clone()
    }

    async fn save(&self, state: AuthState) {
        *self.state.write().await = state;
    }
}

/// Query parameters the identity provider redirects back with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

pub struct AuthorizationFlow {
    identity: IdentityClient,
    store: Arc<dyn CredentialStore>,
}

impl AuthorizationFlow {
    pub fn new(identity: IdentityClient, store: Arc<dyn CredentialStore>) -> Self {
        Self { identity, store }
    }

    pub async fn state(&self) -> AuthState {
        self.store.load().await
    }

    /// Start the delegated flow; returns the URL to send the user agent to.
    ///
    /// Restarting an in-progress flow replaces its nonce.
    pub async fn begin_delegated(&self) -> Result<Url> {
        self.ensure_not_complete().await?;

        let nonce = Uuid::new_v4().simple().to_string();
        let url = self.identity.authorize_url(&nonce)?;

        self.store
            .save(AuthState::InProgress {
                flow: FlowKind::Delegated,
                nonce: Some(nonce),
            })
            .await;
        info!("Delegated authorization started");
        Ok(url)
    }

    /// Handle the provider's redirect. Any failure resets the flow to `none`.
    pub async fn complete_callback(&self, params: CallbackParams) -> Result<AuthorizationMarker> {
        let expected_nonce = match self.store.load().await {
            AuthState::InProgress {
                flow: FlowKind::Delegated,
                nonce,
            } => nonce,
            _ => {
                return Err(SyncError::authorization(
                    "no delegated authorization is in progress",
                ))
            }
        };

        match self.finish_delegated(params, expected_nonce).await {
            Ok(marker) => {
                self.store.save(AuthState::Complete(marker.clone())).await;
                info!(expires_at = %marker.expires_at, "Delegated authorization complete");
                Ok(marker)
            }
            Err(e) => {
                self.store.save(AuthState::None).await;
                warn!(error = %e, "Delegated authorization failed");
                Err(e)
            }
        }
    }

    async fn finish_delegated(
        &self,
        params: CallbackParams,
        expected_nonce: Option<String>,
    ) -> Result<AuthorizationMarker> {
        if let Some(error) = params.error {
            let detail = params.error_description.unwrap_or_default();
            return Err(SyncError::authorization(format!("{error}: {detail}")));
        }

        if expected_nonce.is_some() && params.state != expected_nonce {
            return Err(SyncError::authorization("state parameter mismatch"));
        }

        let code = params
            .code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| SyncError::authorization("no authorization code provided"))?;

        let token = self.identity.exchange_code(&code).await?;
        self.marker(FlowKind::Delegated, &token)
    }

    /// Run the client-credentials flow. The token goes back to the caller only.
    pub async fn authorize_app(&self) -> Result<TokenResponse> {
        self.ensure_not_complete().await?;

        self.store
            .save(AuthState::InProgress {
                flow: FlowKind::App,
                nonce: None,
            })
            .await;

        let granted = self
            .identity
            .client_credentials()
            .await
            .and_then(|token| Ok((self.marker(FlowKind::App, &token)?, token)));

        match granted {
            Ok((marker, token)) => {
                self.store.save(AuthState::Complete(marker)).await;
                info!(expires_in = token.expires_in, "App authorization complete");
                Ok(token)
            }
            Err(e) => {
                self.store.save(AuthState::None).await;
                warn!(error = %e, "App authorization failed");
                Err(e)
            }
        }
    }

    /// Clear any authorization. Returns whether a completed one was cleared.
    pub async fn disconnect(&self) -> bool {
        let was_complete = self.store.load().await.is_complete();
        self.store.save(AuthState::None).await;
        info!(was_complete, "Authorization cleared");
        was_complete
    }

    async fn ensure_not_complete(&self) -> Result<()> {
        if self.store.load().await.is_complete() {
            return Err(SyncError::authorization(
                "already authorized; disconnect before authorizing again",
            ));
        }
        Ok(())
    }

    /// Fails when `expires_in` cannot be represented as an expiry instant.
    fn marker(&self, flow: FlowKind, token: &TokenResponse) -> Result<AuthorizationMarker> {
        let config = self.identity.config();
        let scopes = match (&token.scope, flow) {
            (Some(scope), _) => scope.split_whitespace().map(str::to_string).collect(),
            (None, FlowKind::Delegated) => DELEGATED_SCOPES.iter().map(|s| s.to_string()).collect(),
            (None, FlowKind::App) => vec![APP_SCOPE.to_string()],
        };
        let now = Utc::now();
        let expires_at = i64::try_from(token.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                SyncError::Decode(format!("expires_in out of range: {}", token.expires_in))
            })?;

        Ok(AuthorizationMarker {
            flow,
            tenant_id: config.tenant_id.clone(),
            client_id: config.client_id.clone(),
            scopes,
            authorized_at: now,
            expires_at,
        })
    }
}
