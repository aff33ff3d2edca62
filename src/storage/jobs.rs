use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::models::{CanonicalDate, JobId, JobRecord, JobStatus};

// ---------------------------------------------------------------------------
// JobIdAllocator
// ---------------------------------------------------------------------------

/// Hands out strictly increasing job ids starting at 1.
#[derive(Debug, Default)]
pub struct JobIdAllocator {
    last: AtomicU64,
}

impl JobIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> JobId {
        JobId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The most recently allocated id value, or 0 if none yet.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// JobRegistry
// ---------------------------------------------------------------------------

/// In-memory map of job id to status and requested date.
///
/// Lives for the life of the process; nothing is ever evicted. Safe to share
/// between request handlers and workers without outside locking.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: DashMap<JobId, JobRecord>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, id: JobId, status: JobStatus, date: CanonicalDate) {
        self.jobs.insert(id, JobRecord { status, date });
    }

    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.jobs.get(&id).map(|entry| entry.status)
    }

    pub fn date(&self, id: JobId) -> Option<CanonicalDate> {
        self.jobs.get(&id).map(|entry| entry.date)
    }

    pub fn record(&self, id: JobId) -> Option<JobRecord> {
        self.jobs.get(&id).map(|entry| *entry)
    }

    /// Move an in-progress job to a terminal status.
    ///
    /// Returns false, leaving the entry untouched, when the id is unknown or
    /// the job already reached a terminal status.
    pub fn finish(&self, id: JobId, status: JobStatus) -> bool {
        match self.jobs.get_mut(&id) {
            Some(mut entry) if entry.status == JobStatus::InProgress => {
                entry.status = status;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn in_progress(&self) -> usize {
        self.jobs
            .iter()
            .filter(|entry| entry.status == JobStatus::InProgress)
            .count()
    }
}
