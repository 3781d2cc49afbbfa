//! Shared HTTP plumbing for the Graph, knowledge-base and identity clients.

use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::error::{Result, SyncError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fallback when an error body carries no usable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Build the HTTP client used by every connector. Only the connect phase is
/// bounded; a slow upstream blocks the calling pass.
pub fn build_client() -> Result<Client> {
    Ok(ClientBuilder::new().connect_timeout(CONNECT_TIMEOUT).build()?)
}

/// Pull a human-readable message out of an upstream error body.
///
/// Checks Graph's `error.message`, a top-level `message`, then the OAuth
/// `error_description` / `error` pair.
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return UNKNOWN_ERROR.to_string();
    };

    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| value.get("message").and_then(Value::as_str))
        .or_else(|| value.get("error_description").and_then(Value::as_str))
        .or_else(|| value.get("error").and_then(Value::as_str))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Check the status and decode a JSON body. Empty bodies decode as `null`.
pub async fn upstream_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(SyncError::UpstreamRequest {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let text = if body.trim().is_empty() { "null" } else { &body };
    serde_json::from_str(text).map_err(|e| SyncError::Decode(e.to_string()))
}
