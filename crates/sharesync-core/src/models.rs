//! Records produced by indexing, sync and permission jobs.
//!
//! Field names serialize in camelCase to match the gateway's JSON surface.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SyncError;
use crate::registry::JobRecord;

/// Content categories a caller can ask an indexing pass to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Sites,
    Pages,
    Lists,
    Libraries,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Sites,
        ContentType::Pages,
        ContentType::Lists,
        ContentType::Libraries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Sites => "sites",
            ContentType::Pages => "pages",
            ContentType::Lists => "lists",
            ContentType::Libraries => "libraries",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| SyncError::validation(format!("unknown content type: {s}")))
    }
}

/// Whether a pass is a one-off or schedules a follow-up sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Once,
    #[default]
    Regular,
}

impl FromStr for SyncType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(SyncType::Once),
            "regular" => Ok(SyncType::Regular),
            other => Err(SyncError::validation(format!("unknown sync type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Site,
    List,
    Document,
}

/// One enumerated site, list or document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedItem {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub last_modified: Option<DateTime<Utc>>,
    /// Display name of the owning site; absent for site items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_site: Option<String>,
}

/// Delay before the follow-up pass of a `regular` sync.
pub const REGULAR_SYNC_INTERVAL_HOURS: i64 = 24;

/// Job record created at the end of an indexing pass. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingJob {
    pub id: String,
    pub status: JobStatus,
    pub content_types: Vec<ContentType>,
    pub sync_type: SyncType,
    /// Echoed back; enumeration is bounded by breadth caps instead.
    pub search_depth: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub items_indexed: usize,
    pub next_scheduled_sync: Option<DateTime<Utc>>,
}

impl IndexingJob {
    /// Record a finished pass. Start and end coincide since the pass is reported
    /// as a single instant.
    pub fn completed(
        content_types: Vec<ContentType>,
        sync_type: SyncType,
        search_depth: u32,
        items_indexed: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let next_scheduled_sync = match sync_type {
            SyncType::Regular => Some(now + Duration::hours(REGULAR_SYNC_INTERVAL_HOURS)),
            SyncType::Once => None,
        };

        Self {
            id: new_job_id("job"),
            status: JobStatus::Completed,
            content_types,
            sync_type,
            search_depth,
            start_time: now,
            end_time: now,
            items_indexed,
            next_scheduled_sync,
        }
    }
}

impl JobRecord for IndexingJob {
    fn job_id(&self) -> &str {
        &self.id
    }
}

/// Expected duration of a manual sync, reported to the caller up front.
pub const SYNC_ESTIMATE_MINUTES: i64 = 10;

/// Manual sync request. Recorded as started; no work is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncJob {
    pub id: String,
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
    pub estimated_completion_time: DateTime<Utc>,
}

impl SyncJob {
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            id: new_job_id("sync-job"),
            status: JobStatus::Started,
            start_time: now,
            estimated_completion_time: now + Duration::minutes(SYNC_ESTIMATE_MINUTES),
        }
    }
}

impl JobRecord for SyncJob {
    fn job_id(&self) -> &str {
        &self.id
    }
}

/// Permission mirroring request. Recorded as started; nothing is propagated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionJob {
    pub id: String,
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
}

impl PermissionJob {
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            id: new_job_id("perm-job"),
            status: JobStatus::Started,
            start_time: now,
        }
    }
}

impl JobRecord for PermissionJob {
    fn job_id(&self) -> &str {
        &self.id
    }
}

/// Opaque id whose suffix is a time-ordered UUID.
fn new_job_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_job_schedules_next_sync() {
        let now = Utc::now();
        let job = IndexingJob::completed(vec![ContentType::Sites], SyncType::Regular, 3, 7, now);

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.start_time, job.end_time);
        assert_eq!(job.next_scheduled_sync, Some(now + Duration::hours(24)));
        assert!(job.id.starts_with("job-"));
    }

    #[test]
    fn test_once_job_serializes_null_next_sync() {
        let job = IndexingJob::completed(vec![ContentType::Sites], SyncType::Once, 3, 0, Utc::now());
        let json = serde_json::to_value(&job).unwrap();

        assert!(json["nextScheduledSync"].is_null());
        assert_eq!(json["syncType"], "once");
        assert_eq!(json["contentTypes"], serde_json::json!(["sites"]));
        assert_eq!(json["itemsIndexed"], 0);
    }

    #[test]
    fn test_job_ids_are_unique() {
        let now = Utc::now();
        let a = SyncJob::started(now);
        let b = SyncJob::started(now);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("sync-job-"));
        assert_eq!(a.estimated_completion_time - a.start_time, Duration::minutes(10));
    }

    #[test]
    fn test_site_item_omits_parent() {
        let item = IndexedItem {
            id: "s1".into(),
            title: "Site".into(),
            url: "https://contoso.sharepoint.com/sites/s1".into(),
            kind: ItemKind::Site,
            last_modified: None,
            parent_site: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "site");
        assert!(json.get("parentSite").is_none());
    }

    #[test]
    fn test_content_type_from_str() {
        assert_eq!("libraries".parse::<ContentType>().unwrap(), ContentType::Libraries);
        assert!("folders".parse::<ContentType>().is_err());
        assert_eq!("once".parse::<SyncType>().unwrap(), SyncType::Once);
    }
}
