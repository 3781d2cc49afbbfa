//! Configuration sections consumed by the core clients.
//!
//! The CLI deserializes these from TOML and overlays secrets from the
//! environment before calling [`IdentityConfig::validate`] and friends.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SyncError};
use crate::orchestrator::{
    BreadthCaps, DEFAULT_DOCUMENTS_PER_SITE, DEFAULT_LISTS_PER_SITE, DEFAULT_PREVIEW_LIMIT,
    DEFAULT_SITE_LIMIT,
};

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// A credential that never prints its value.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// App registration in the Microsoft identity platform.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub tenant_id: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Secret,
    pub redirect_uri: String,
    #[serde(default = "default_authority")]
    pub authority: String,
}

impl IdentityConfig {
    pub fn validate(&self) -> Result<()> {
        require("identity.tenant_id", &self.tenant_id)?;
        require("identity.client_id", &self.client_id)?;
        require("identity.redirect_uri", &self.redirect_uri)?;
        url::Url::parse(&self.redirect_uri).map_err(|e| {
            SyncError::config(format!("identity.redirect_uri is not a valid URL: {e}"))
        })?;
        if self.client_secret.is_empty() {
            return Err(SyncError::config("identity client secret is not set"));
        }
        Ok(())
    }
}

/// Content-source (Graph) endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_graph_base_url(),
        }
    }
}

/// Knowledge-base endpoint and basic-auth credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBaseConfig {
    pub base_url: String,
    pub username: String,
    #[serde(default)]
    pub password: Secret,
}

impl KnowledgeBaseConfig {
    pub fn validate(&self) -> Result<()> {
        require("knowledge_base.base_url", &self.base_url)?;
        require("knowledge_base.username", &self.username)?;
        if self.password.is_empty() {
            return Err(SyncError::config("knowledge base password is not set"));
        }
        Ok(())
    }
}

/// Breadth caps for an indexing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    #[serde(default = "default_max_sites")]
    pub max_sites: usize,
    #[serde(default = "default_max_lists")]
    pub max_lists_per_site: usize,
    #[serde(default = "default_max_documents")]
    pub max_documents_per_site: usize,
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            max_sites: default_max_sites(),
            max_lists_per_site: default_max_lists(),
            max_documents_per_site: default_max_documents(),
            preview_limit: default_preview_limit(),
        }
    }
}

impl From<&IndexingConfig> for BreadthCaps {
    fn from(config: &IndexingConfig) -> Self {
        BreadthCaps {
            sites: config.max_sites,
            lists_per_site: config.max_lists_per_site,
            documents_per_site: config.max_documents_per_site,
            preview: config.preview_limit,
        }
    }
}

fn require(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::config(format!("{key} must not be empty")));
    }
    Ok(())
}

fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

fn default_graph_base_url() -> String {
    DEFAULT_GRAPH_BASE_URL.to_string()
}

fn default_max_sites() -> usize {
    DEFAULT_SITE_LIMIT
}

fn default_max_lists() -> usize {
    DEFAULT_LISTS_PER_SITE
}

fn default_max_documents() -> usize {
    DEFAULT_DOCUMENTS_PER_SITE
}

fn default_preview_limit() -> usize {
    DEFAULT_PREVIEW_LIMIT
}
