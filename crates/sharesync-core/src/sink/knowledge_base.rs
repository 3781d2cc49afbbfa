use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Ack, KnowledgeHit, SinkConnector};
use crate::config::{KnowledgeBaseConfig, Secret};
use crate::error::Result;
use crate::http::{build_client, upstream_json};

const CONTENT_PATH: &str = "/api/v2/knowledge/content";
const SEARCH_PATH: &str = "/api/v2/knowledge/search";
const PERMISSIONS_PATH: &str = "/api/v2/knowledge/permissions";

/// eGain-style knowledge-base client using basic authentication.
pub struct KnowledgeBaseClient {
    client: Client,
    base_url: String,
    username: String,
    password: Secret,
}

impl KnowledgeBaseClient {
    pub fn new(config: &KnowledgeBaseConfig) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// `Basic base64(username:password)`
    fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password.expose());
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "Knowledge base request");
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", self.authorization())
            .header("Content-Type", "application/json")
    }
}

#[async_trait]
impl SinkConnector for KnowledgeBaseClient {
    async fn index_content(&self, content: &Value) -> Result<Ack> {
        let response = self
            .request(Method::POST, CONTENT_PATH)
            .json(content)
            .send()
            .await?;
        upstream_json(response).await
    }

    async fn update_content(&self, content_id: &str, content: &Value) -> Result<Ack> {
        let response = self
            .request(Method::PUT, &format!("{CONTENT_PATH}/{content_id}"))
            .json(content)
            .send()
            .await?;
        upstream_json(response).await
    }

    async fn delete_content(&self, content_id: &str) -> Result<Ack> {
        let response = self
            .request(Method::DELETE, &format!("{CONTENT_PATH}/{content_id}"))
            .send()
            .await?;
        upstream_json(response).await
    }

    async fn search_content(
        &self,
        query: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<KnowledgeHit>> {
        let mut params = vec![("q", query)];
        if let Some(user_id) = user_id {
            params.push(("userId", user_id));
        }

        let response = self
            .request(Method::GET, SEARCH_PATH)
            .query(&params)
            .send()
            .await?;

        let envelope: SearchEnvelope = upstream_json(response).await?;
        Ok(envelope.into_hits())
    }

    async fn map_permissions(&self, permissions: &Value) -> Result<Ack> {
        let response = self
            .request(Method::POST, PERMISSIONS_PATH)
            .json(permissions)
            .send()
            .await?;
        upstream_json(response).await
    }
}

/// Search responses arrive either wrapped in `results` or as a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchEnvelope {
    Wrapped {
        #[serde(default)]
        results: Vec<KnowledgeHit>,
    },
    Bare(Vec<KnowledgeHit>),
}

impl SearchEnvelope {
    fn into_hits(self) -> Vec<KnowledgeHit> {
        match self {
            SearchEnvelope::Wrapped { results } => results,
            SearchEnvelope::Bare(hits) => hits,
        }
    }
}
