use std::fmt;

use serde::{Deserialize, Serialize};

use super::date::CanonicalDate;

/// Process-unique, strictly increasing extraction job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// `Completed` and `Failed` never change once recorded.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One entry in the job registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRecord {
    pub status: JobStatus,
    pub date: CanonicalDate,
}

/// Caller-visible answer to a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusReport {
    InProgress,
    Completed,
    Failed,
    NotFound,
}

impl From<Option<JobStatus>> for StatusReport {
    fn from(status: Option<JobStatus>) -> Self {
        match status {
            Some(JobStatus::InProgress) => StatusReport::InProgress,
            Some(JobStatus::Completed) => StatusReport::Completed,
            Some(JobStatus::Failed) => StatusReport::Failed,
            None => StatusReport::NotFound,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            StatusReport::InProgress => "IN_PROGRESS",
            StatusReport::Completed => "COMPLETED",
            StatusReport::Failed => "FAILED",
            StatusReport::NotFound => "NOT_FOUND",
        };
        f.write_str(word)
    }
}

/// Result of asking for a job's artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutcome {
    Content(Vec<u8>),
    StillProcessing,
    Failed,
    NotFound,
}
