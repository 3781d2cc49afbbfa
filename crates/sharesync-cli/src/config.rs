use anyhow::{Context, Result};
use serde::Deserialize;
use sharesync_core::{
    IdentityConfig, IndexingConfig, KnowledgeBaseConfig, Secret, SourceConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "sharesync.toml";

pub const CLIENT_SECRET_ENV: &str = "SHARESYNC_CLIENT_SECRET";
pub const KB_PASSWORD_ENV: &str = "SHARESYNC_KB_PASSWORD";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Required by `serve`; `index` works without it.
    pub identity: Option<IdentityConfig>,

    #[serde(default)]
    pub source: SourceConfig,

    /// Required by `serve`.
    pub knowledge_base: Option<KnowledgeBaseConfig>,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub auth: AuthPagesConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Pages the authorization callback redirects to.
#[derive(Debug, Deserialize)]
pub struct AuthPagesConfig {
    #[serde(default = "default_success_redirect")]
    pub success_redirect: String,

    #[serde(default = "default_error_redirect")]
    pub error_redirect: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_success_redirect() -> String {
    "/auth/success".to_string()
}

fn default_error_redirect() -> String {
    "/auth/error".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for AuthPagesConfig {
    fn default() -> Self {
        Self {
            success_redirect: default_success_redirect(),
            error_redirect: default_error_redirect(),
        }
    }
}

impl Config {
    /// Overlay secrets from the environment. Set variables win over file values.
    pub fn apply_secrets<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(identity), Some(secret)) = (self.identity.as_mut(), lookup(CLIENT_SECRET_ENV)) {
            identity.client_secret = Secret::new(secret);
        }
        if let (Some(kb), Some(password)) = (self.knowledge_base.as_mut(), lookup(KB_PASSWORD_ENV)) {
            kb.password = Secret::new(password);
        }
    }
}

/// Load config from `path`, or from `./sharesync.toml` when present, else defaults.
///
/// Secrets from the environment are applied afterwards.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => parse_file(&expand(path))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                parse_file(default_path)?
            } else {
                Config::default()
            }
        }
    };

    config.apply_secrets(|name| std::env::var(name).ok().filter(|v| !v.is_empty()));
    Ok(config)
}

fn parse_file(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
    toml::from_str(&content).context("Failed to parse TOML config")
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
