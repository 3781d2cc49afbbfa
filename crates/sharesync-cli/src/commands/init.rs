use anyhow::Result;
use std::path::Path;

pub const DEFAULT_CONFIG: &str = r#"# ShareSync Configuration
#
# Secrets are read from the environment:
#   SHARESYNC_CLIENT_SECRET  identity app client secret
#   SHARESYNC_KB_PASSWORD    knowledge-base password

[server]
host = "127.0.0.1"
port = 8080
allowed_origins = []

[identity]
tenant_id = ""
client_id = ""
redirect_uri = "http://localhost:8080/api/auth/callback"
# authority = "https://login.microsoftonline.com"

[source]
# base_url = "https://graph.microsoft.com/v1.0"

[knowledge_base]
base_url = ""
username = ""

[indexing]
max_sites = 5
max_lists_per_site = 3
max_documents_per_site = 3
preview_limit = 10

[auth]
success_redirect = "/auth/success"
error_redirect = "/auth/error"
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}
