//! Content-source connector: read access to SharePoint through a Graph-like REST API.

pub mod graph;

pub use graph::{GraphClient, GraphSourceProvider};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Name of the library SharePoint stores modern pages in.
pub const SITE_PAGES_LIST: &str = "Site Pages";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub last_modified_date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteList {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub last_modified_date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub last_modified_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fields: Option<Value>,
}

/// An entry of a document library's root folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub last_modified_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file: Option<FileFacet>,
    #[serde(default)]
    pub folder: Option<FolderFacet>,
}

impl DriveItem {
    /// Folders carry no `file` facet.
    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    #[serde(default)]
    pub child_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub hit_id: String,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub resource: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub granted_to_v2: Option<Value>,
    #[serde(default)]
    pub granted_to_identities_v2: Vec<Value>,
}

/// Read operations against the content source, bound to one bearer token.
///
/// Every call is a single request (except [`SourceConnector::list_pages`]);
/// a non-2xx status fails the call with `SyncError::UpstreamRequest`.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    async fn list_sites(&self) -> Result<Vec<Site>>;

    async fn get_site(&self, site_id: &str) -> Result<Site>;

    async fn list_lists(&self, site_id: &str) -> Result<Vec<SiteList>>;

    async fn list_list_items(&self, site_id: &str, list_id: &str) -> Result<Vec<ListItem>>;

    async fn list_documents(&self, site_id: &str) -> Result<Vec<DriveItem>>;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    async fn get_site_permissions(&self, site_id: &str) -> Result<Vec<Permission>>;

    async fn get_item_permissions(&self, site_id: &str, item_id: &str)
        -> Result<Vec<Permission>>;

    /// Items of the site's "Site Pages" library, or nothing if the site has none.
    async fn list_pages(&self, site_id: &str) -> Result<Vec<ListItem>> {
        let lists = self.list_lists(site_id).await?;
        let pages = lists
            .iter()
            .find(|list| list.name == SITE_PAGES_LIST || list.display_name == SITE_PAGES_LIST);
        match pages {
            Some(pages) => self.list_list_items(site_id, &pages.id).await,
            None => Ok(Vec::new()),
        }
    }
}

/// Binds an access token to a connector for the lifetime of one request.
pub trait SourceProvider: Send + Sync {
    fn connect(&self, access_token: &str) -> Result<Box<dyn SourceConnector>>;
}
