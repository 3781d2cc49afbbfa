use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::{IdentityConfig, Secret};
use crate::error::{Result, SyncError};
use crate::http::{build_client, error_message};

/// Scopes requested on behalf of a signed-in user.
pub const DELEGATED_SCOPES: [&str; 3] = [
    "Sites.Read.All",
    "Sites.ReadWrite.All",
    "Files.ReadWrite.All",
];

/// Tenant-wide application permissions.
pub const APP_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Successful response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Secret,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Client for the identity platform's v2.0 authorize and token endpoints.
pub struct IdentityClient {
    client: Client,
    config: IdentityConfig,
}

impl IdentityClient {
    pub fn new(config: IdentityConfig) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            config,
        })
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/{}",
            self.config.authority.trim_end_matches('/'),
            self.config.tenant_id,
            name
        )
    }

    /// URL the user agent is sent to for the authorization-code flow.
    pub fn authorize_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint("authorize"))
            .map_err(|e| SyncError::config(format!("invalid identity authority: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", &DELEGATED_SCOPES.join(" "))
            .append_pair("state", state);

        Ok(url)
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let scope = DELEGATED_SCOPES.join(" ");
        self.request_token(&[
            ("client_id", self.config.client_id.as_str()),
            ("scope", scope.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
            ("client_secret", self.config.client_secret.expose()),
        ])
        .await
    }

    /// Request an app-only token with the client-credentials grant.
    pub async fn client_credentials(&self) -> Result<TokenResponse> {
        self.request_token(&[
            ("client_id", self.config.client_id.as_str()),
            ("scope", APP_SCOPE),
            ("client_secret", self.config.client_secret.expose()),
            ("grant_type", "client_credentials"),
        ])
        .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let grant_type = form
            .iter()
            .find(|(key, _)| *key == "grant_type")
            .map(|(_, value)| *value)
            .unwrap_or_default();
        debug!(grant_type, tenant = %self.config.tenant_id, "Requesting token");

        let response = self
            .client
            .post(self.endpoint("token"))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::TokenExchange {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| SyncError::Decode(e.to_string()))
    }
}
