//! Knowledge-base sink connector: content upsert/delete/search and permission mapping.

pub mod knowledge_base;

pub use knowledge_base::KnowledgeBaseClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Body returned by a write call; `null` when the sink answers with no content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ack(pub Value);

/// A search result as the knowledge base reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeHit {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub site_title: Option<String>,
}

#[async_trait]
pub trait SinkConnector: Send + Sync {
    async fn index_content(&self, content: &Value) -> Result<Ack>;

    async fn update_content(&self, content_id: &str, content: &Value) -> Result<Ack>;

    async fn delete_content(&self, content_id: &str) -> Result<Ack>;

    /// Search indexed content on behalf of `user_id`, when one is known.
    async fn search_content(&self, query: &str, user_id: Option<&str>)
        -> Result<Vec<KnowledgeHit>>;

    async fn map_permissions(&self, permissions: &Value) -> Result<Ack>;
}
