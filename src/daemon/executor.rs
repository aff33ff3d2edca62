use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use tokio::sync::broadcast;

use crate::daemon::events::JobEvent;
use crate::errors::LogSliceError;
use crate::models::{CanonicalDate, JobId, JobStatus};
use crate::storage::jobs::JobRegistry;
use crate::storage::ArtifactStore;

/// Handle to a scheduled extraction.
///
/// Awaiting `join_handle` yields the terminal status the worker recorded.
/// Dropping the handle does not cancel the worker.
pub struct WorkerHandle {
    pub job_id: JobId,
    pub join_handle: tokio::task::JoinHandle<JobStatus>,
}

/// Runs extraction jobs on the tokio runtime and records their outcome.
pub struct Extractor {
    registry: Arc<JobRegistry>,
    store: Arc<dyn ArtifactStore>,
    event_tx: broadcast::Sender<JobEvent>,
    delay: Duration,
}

impl Extractor {
    pub fn new(
        registry: Arc<JobRegistry>,
        store: Arc<dyn ArtifactStore>,
        event_tx: broadcast::Sender<JobEvent>,
        delay: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            event_tx,
            delay,
        }
    }

    /// Schedule the worker for `job_id`. Returns immediately.
    ///
    /// The worker always leaves the job in a terminal status: I/O errors and
    /// panics inside the store both end as `Failed`.
    pub fn spawn(&self, job_id: JobId, date: CanonicalDate) -> WorkerHandle {
        let registry = Arc::clone(&self.registry);
        let store = Arc::clone(&self.store);
        let event_tx = self.event_tx.clone();
        let delay = self.delay;

        let join_handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::debug!("Extraction job {} started for {}", job_id, date);
            let outcome = AssertUnwindSafe(store.extract(&date)).catch_unwind().await;

            let (status, event) = match outcome {
                Ok(Ok(lines)) => {
                    tracing::info!(
                        "Extraction job {} completed: {} line(s) for {}",
                        job_id,
                        lines,
                        date
                    );
                    (
                        JobStatus::Completed,
                        JobEvent::Completed {
                            job_id,
                            date,
                            lines,
                            timestamp: Utc::now(),
                        },
                    )
                }
                Ok(Err(e)) => {
                    tracing::error!("Extraction job {} for {} failed: {}", job_id, date, e);
                    (
                        JobStatus::Failed,
                        JobEvent::Failed {
                            job_id,
                            date,
                            error: e.to_string(),
                            timestamp: Utc::now(),
                        },
                    )
                }
                Err(payload) => {
                    let err = LogSliceError::Internal(format!(
                        "extraction worker panicked: {}",
                        panic_message(payload.as_ref())
                    ));
                    tracing::error!("Extraction job {} for {} failed: {}", job_id, date, err);
                    (
                        JobStatus::Failed,
                        JobEvent::Failed {
                            job_id,
                            date,
                            error: err.to_string(),
                            timestamp: Utc::now(),
                        },
                    )
                }
            };

            if !registry.finish(job_id, status) {
                tracing::warn!("Extraction job {} was not in progress when it finished", job_id);
            }
            let _ = event_tx.send(event);

            status
        });

        WorkerHandle {
            job_id,
            join_handle,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
