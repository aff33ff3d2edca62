use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CanonicalDate, JobId};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum JobEvent {
    Submitted {
        job_id: JobId,
        date: CanonicalDate,
        timestamp: DateTime<Utc>,
    },
    Completed {
        job_id: JobId,
        date: CanonicalDate,
        lines: u64,
        timestamp: DateTime<Utc>,
    },
    Failed {
        job_id: JobId,
        date: CanonicalDate,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::Submitted { job_id, .. }
            | JobEvent::Completed { job_id, .. }
            | JobEvent::Failed { job_id, .. } => *job_id,
        }
    }

    /// SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            JobEvent::Submitted { .. } => "submitted",
            JobEvent::Completed { .. } => "completed",
            JobEvent::Failed { .. } => "failed",
        }
    }
}
