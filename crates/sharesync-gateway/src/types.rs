//! Request and response bodies of the HTTP surface.

use serde::{Deserialize, Serialize};
use sharesync_core::{
    ContentType, IndexedItem, IndexingJob, KnowledgeHit, PermissionJob, SyncJob, SyncType,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// POST /api/sharepoint/index. `accessToken` is checked before decoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    #[serde(default = "default_content_types")]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub sync_type: SyncType,
    #[serde(default = "default_search_depth")]
    pub search_depth: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub success: bool,
    pub message: String,
    pub job: IndexingJob,
    pub indexed_items: Vec<IndexedItem>,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse<J> {
    pub success: bool,
    pub jobs: Vec<J>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusQuery {
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncJobResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub job: SyncJob,
}

/// POST /api/sharepoint/permissions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    #[serde(default = "default_mirror_permissions")]
    pub mirror_permissions: bool,
}

#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<PermissionJob>,
}

/// POST /api/sharepoint/search. `query` and `accessToken` are checked before decoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub user_id: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<KnowledgeHit>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_results: usize,
    pub total_pages: usize,
}

/// GET /api/auth/sharepoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthQuery {
    pub auth_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppTokenResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub success: bool,
    pub message: String,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn default_content_types() -> Vec<ContentType> {
    ContentType::ALL.to_vec()
}

fn default_search_depth() -> u32 {
    sharesync_core::orchestrator::DEFAULT_SEARCH_DEPTH
}

fn default_mirror_permissions() -> bool {
    true
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}
