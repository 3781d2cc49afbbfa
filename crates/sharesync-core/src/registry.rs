use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A record the registry can key by id.
pub trait JobRecord: Clone + Send + Sync + 'static {
    fn job_id(&self) -> &str;
}

/// Process-local job store keyed by job id.
///
/// Safe for concurrent `put`. `list` returns jobs in first-insertion order;
/// replacing an existing id keeps its original position.
pub struct JobRegistry<J: JobRecord> {
    jobs: DashMap<String, (u64, J)>,
    next_seq: AtomicU64,
}

impl<J: JobRecord> JobRegistry<J> {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn put(&self, job: J) {
        match self.jobs.entry(job.job_id().to_string()) {
            Entry::Occupied(mut entry) => entry.get_mut().1 = job,
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert((seq, job));
            }
        }
    }

    pub fn get(&self, job_id: &str) -> Option<J> {
        self.jobs.get(job_id).map(|entry| entry.value().1.clone())
    }

    pub fn list(&self) -> Vec<J> {
        let mut entries: Vec<(u64, J)> = self
            .jobs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, job)| job).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl<J: JobRecord> Default for JobRegistry<J> {
    fn default() -> Self {
        Self::new()
    }
}
