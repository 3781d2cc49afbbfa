use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{
    DriveItem, ListItem, Permission, SearchHit, Site, SiteList, SourceConnector, SourceProvider,
};
use crate::config::{SourceConfig, DEFAULT_GRAPH_BASE_URL};
use crate::error::Result;
use crate::http::{build_client, upstream_json};

/// Entity types a content search spans.
const SEARCH_ENTITY_TYPES: [&str; 4] = ["driveItem", "listItem", "list", "site"];
const SEARCH_PAGE_SIZE: u32 = 25;

/// Microsoft Graph client bound to one bearer token.
pub struct GraphClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GraphClient {
    pub fn new(access_token: &str) -> Result<Self> {
        Ok(Self::with_client(build_client()?, access_token))
    }

    fn with_client(client: Client, access_token: &str) -> Self {
        Self {
            client,
            access_token: access_token.to_string(),
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
        }
    }

    /// Point at a Graph-compatible endpoint other than the public cloud.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!(endpoint, "Graph GET");
        let response = self
            .client
            .get(self.url(endpoint))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .send()
            .await?;
        upstream_json(response).await
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<T> {
        debug!(endpoint, "Graph POST");
        let response = self
            .client
            .post(self.url(endpoint))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(body)
            .send()
            .await?;
        upstream_json(response).await
    }

    async fn collection<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let page: Collection<T> = self.get(endpoint).await?;
        Ok(page.value)
    }
}

#[async_trait]
impl SourceConnector for GraphClient {
    async fn list_sites(&self) -> Result<Vec<Site>> {
        self.collection("/sites?search=*").await
    }

    async fn get_site(&self, site_id: &str) -> Result<Site> {
        self.get(&format!("/sites/{site_id}")).await
    }

    async fn list_lists(&self, site_id: &str) -> Result<Vec<SiteList>> {
        self.collection(&format!("/sites/{site_id}/lists")).await
    }

    async fn list_list_items(&self, site_id: &str, list_id: &str) -> Result<Vec<ListItem>> {
        self.collection(&format!(
            "/sites/{site_id}/lists/{list_id}/items?expand=fields"
        ))
        .await
    }

    async fn list_documents(&self, site_id: &str) -> Result<Vec<DriveItem>> {
        self.collection(&format!("/sites/{site_id}/drive/root/children"))
            .await
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let body = json!({
            "requests": [{
                "entityTypes": SEARCH_ENTITY_TYPES,
                "query": { "queryString": query },
                "from": 0,
                "size": SEARCH_PAGE_SIZE,
            }]
        });

        let response: Collection<SearchResponse> = self.post("/search/query", &body).await?;
        Ok(response
            .value
            .into_iter()
            .flat_map(|r| r.hits_containers)
            .flat_map(|c| c.hits)
            .collect())
    }

    async fn get_site_permissions(&self, site_id: &str) -> Result<Vec<Permission>> {
        self.collection(&format!("/sites/{site_id}/permissions"))
            .await
    }

    async fn get_item_permissions(
        &self,
        site_id: &str,
        item_id: &str,
    ) -> Result<Vec<Permission>> {
        self.collection(&format!("/sites/{site_id}/items/{item_id}/permissions"))
            .await
    }
}

/// Hands out [`GraphClient`]s sharing one connection pool.
pub struct GraphSourceProvider {
    client: Client,
    base_url: String,
}

impl GraphSourceProvider {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: config.base_url.clone(),
        })
    }
}

impl SourceProvider for GraphSourceProvider {
    fn connect(&self, access_token: &str) -> Result<Box<dyn SourceConnector>> {
        let client =
            GraphClient::with_client(self.client.clone(), access_token).with_base_url(&self.base_url);
        Ok(Box::new(client))
    }
}

/// Graph's `{ "value": [...] }` envelope.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    hits_containers: Vec<HitsContainer>,
}

#[derive(Debug, Deserialize)]
struct HitsContainer {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let client = GraphClient::new("token")
            .unwrap()
            .with_base_url("http://localhost:9000/v1.0/");
        assert_eq!(client.url("/sites"), "http://localhost:9000/v1.0/sites");
    }

    #[test]
    fn test_collection_tolerates_missing_value() {
        let page: Collection<Site> = serde_json::from_str("{}").unwrap();
        assert!(page.value.is_empty());
    }

    #[test]
    fn test_drive_item_file_facet() {
        let folder: DriveItem =
            serde_json::from_value(json!({"id": "1", "name": "Shared", "folder": {"childCount": 2}}))
                .unwrap();
        let file: DriveItem = serde_json::from_value(
            json!({"id": "2", "name": "a.docx", "file": {"mimeType": "application/msword"}}),
        )
        .unwrap();
        assert!(!folder.is_file());
        assert!(file.is_file());
    }
}
