//! Indexing orchestrator.
//!
//! Walks the content source breadth-first up to fixed caps and records one
//! [`IndexingJob`] per successful pass. Calls run strictly one after another:
//! a site's lists and documents are fetched before the next site is touched.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Result, SyncError};
use crate::models::{ContentType, IndexedItem, IndexingJob, ItemKind, SyncType};
use crate::registry::JobRegistry;
use crate::source::{Site, SourceConnector};

pub const DEFAULT_SITE_LIMIT: usize = 5;
pub const DEFAULT_LISTS_PER_SITE: usize = 3;
pub const DEFAULT_DOCUMENTS_PER_SITE: usize = 3;
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;
pub const DEFAULT_SEARCH_DEPTH: u32 = 3;

/// Maximum children enumerated per parent, independent of `search_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreadthCaps {
    pub sites: usize,
    pub lists_per_site: usize,
    pub documents_per_site: usize,
    /// Items echoed back to the caller.
    pub preview: usize,
}

impl Default for BreadthCaps {
    fn default() -> Self {
        Self {
            sites: DEFAULT_SITE_LIMIT,
            lists_per_site: DEFAULT_LISTS_PER_SITE,
            documents_per_site: DEFAULT_DOCUMENTS_PER_SITE,
            preview: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

/// Caller-supplied options for one pass.
#[derive(Debug, Clone)]
pub struct IndexingRequest {
    pub content_types: Vec<ContentType>,
    pub sync_type: SyncType,
    /// Accepted and echoed into the job; it does not bound traversal.
    pub search_depth: u32,
}

impl Default for IndexingRequest {
    fn default() -> Self {
        Self {
            content_types: ContentType::ALL.to_vec(),
            sync_type: SyncType::Regular,
            search_depth: DEFAULT_SEARCH_DEPTH,
        }
    }
}

impl IndexingRequest {
    fn includes(&self, content_type: ContentType) -> bool {
        self.content_types.contains(&content_type)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingOutcome {
    pub job: IndexingJob,
    #[serde(rename = "indexedItems")]
    pub preview: Vec<IndexedItem>,
}

pub struct IndexingOrchestrator {
    caps: BreadthCaps,
    registry: Arc<JobRegistry<IndexingJob>>,
}

impl IndexingOrchestrator {
    pub fn new(registry: Arc<JobRegistry<IndexingJob>>) -> Self {
        Self {
            caps: BreadthCaps::default(),
            registry,
        }
    }

    pub fn with_caps(mut self, caps: BreadthCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn caps(&self) -> BreadthCaps {
        self.caps
    }

    pub fn registry(&self) -> &Arc<JobRegistry<IndexingJob>> {
        &self.registry
    }

    /// Run one pass to completion and record its job.
    ///
    /// Any connector failure aborts the pass with `SyncError::IndexingFailed`
    /// and leaves the registry untouched.
    pub async fn run_indexing_pass(
        &self,
        source: &dyn SourceConnector,
        request: IndexingRequest,
    ) -> Result<IndexingOutcome> {
        info!(
            content_types = ?request.content_types,
            sync_type = ?request.sync_type,
            search_depth = request.search_depth,
            "Starting indexing pass"
        );

        let items = match self.enumerate(source, &request).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Indexing pass aborted");
                return Err(SyncError::indexing_failed(e));
            }
        };

        let job = IndexingJob::completed(
            request.content_types,
            request.sync_type,
            request.search_depth,
            items.len(),
            Utc::now(),
        );
        self.registry.put(job.clone());

        info!(job_id = %job.id, items = job.items_indexed, "Indexing pass completed");

        let preview = items.into_iter().take(self.caps.preview).collect();
        Ok(IndexingOutcome { job, preview })
    }

    async fn enumerate(
        &self,
        source: &dyn SourceConnector,
        request: &IndexingRequest,
    ) -> Result<Vec<IndexedItem>> {
        let sites = source.list_sites().await?;
        let mut items = Vec::new();

        for site in sites.into_iter().take(self.caps.sites) {
            items.push(site_item(&site));

            if request.includes(ContentType::Lists) {
                let lists = source.list_lists(&site.id).await?;
                for list in lists.into_iter().take(self.caps.lists_per_site) {
                    items.push(IndexedItem {
                        url: format!("{}/lists/{}", site.web_url, list.name),
                        id: list.id,
                        title: list.display_name,
                        kind: ItemKind::List,
                        last_modified: list.last_modified_date_time,
                        parent_site: Some(site.display_name.clone()),
                    });
                }
            }

            if request.includes(ContentType::Libraries) {
                let documents = source.list_documents(&site.id).await?;
                let files = documents.into_iter().filter(|doc| doc.is_file());
                for doc in files.take(self.caps.documents_per_site) {
                    items.push(IndexedItem {
                        id: doc.id,
                        title: doc.name,
                        url: doc.web_url,
                        kind: ItemKind::Document,
                        last_modified: doc.last_modified_date_time,
                        parent_site: Some(site.display_name.clone()),
                    });
                }
            }
        }

        Ok(items)
    }
}

fn site_item(site: &Site) -> IndexedItem {
    IndexedItem {
        id: site.id.clone(),
        title: site.display_name.clone(),
        url: site.web_url.clone(),
        kind: ItemKind::Site,
        last_modified: site.last_modified_date_time,
        parent_site: None,
    }
}
