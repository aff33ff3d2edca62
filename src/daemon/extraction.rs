use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};

use crate::daemon::events::JobEvent;
use crate::daemon::executor::{Extractor, WorkerHandle};
use crate::errors::LogSliceError;
use crate::models::{normalize, ArtifactOutcome, Clock, JobId, JobStatus, StatusReport};
use crate::storage::jobs::{JobIdAllocator, JobRegistry};
use crate::storage::ArtifactStore;

/// Entry point for date-extraction jobs: submit, poll, fetch.
///
/// One instance is built at startup and shared by every request handler.
/// Tests build their own isolated instances.
pub struct ExtractionService {
    allocator: JobIdAllocator,
    registry: Arc<JobRegistry>,
    store: Arc<dyn ArtifactStore>,
    extractor: Extractor,
    clock: Arc<dyn Clock>,
    event_tx: broadcast::Sender<JobEvent>,
    read_lock: Mutex<()>,
}

impl ExtractionService {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        clock: Arc<dyn Clock>,
        event_tx: broadcast::Sender<JobEvent>,
        worker_delay: Duration,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let extractor = Extractor::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            event_tx.clone(),
            worker_delay,
        );
        Self {
            allocator: JobIdAllocator::new(),
            registry,
            store,
            extractor,
            clock,
            event_tx,
            read_lock: Mutex::new(()),
        }
    }

    /// Validate `raw_date` and schedule an extraction for it.
    ///
    /// A rejected date never allocates an id or touches the registry. On
    /// success the job is already `IN_PROGRESS` when this returns.
    pub fn submit(&self, raw_date: &str) -> Result<WorkerHandle, LogSliceError> {
        let date = normalize(raw_date, self.clock.today())?;

        let job_id = self.allocator.next();
        self.registry.put(job_id, JobStatus::InProgress, date);
        tracing::info!("Extraction job {} submitted for {}", job_id, date);

        let _ = self.event_tx.send(JobEvent::Submitted {
            job_id,
            date,
            timestamp: Utc::now(),
        });

        Ok(self.extractor.spawn(job_id, date))
    }

    pub fn status(&self, job_id: JobId) -> StatusReport {
        let report = StatusReport::from(self.registry.status(job_id));
        tracing::debug!("Status of job {}: {}", job_id, report);
        report
    }

    /// Fetch the artifact of a finished job.
    ///
    /// Reads are serialized so a caller never sees a half-read artifact.
    pub async fn artifact(&self, job_id: JobId) -> Result<ArtifactOutcome, LogSliceError> {
        let _guard = self.read_lock.lock().await;

        let Some(record) = self.registry.record(job_id) else {
            return Ok(ArtifactOutcome::NotFound);
        };

        match record.status {
            JobStatus::InProgress => Ok(ArtifactOutcome::StillProcessing),
            JobStatus::Failed => Ok(ArtifactOutcome::Failed),
            JobStatus::Completed => match self.store.read_artifact(&record.date).await? {
                Some(bytes) => Ok(ArtifactOutcome::Content(bytes)),
                None => {
                    tracing::warn!(
                        "Job {} is COMPLETED but the artifact {} is missing",
                        job_id,
                        record.date.artifact_file_name()
                    );
                    Ok(ArtifactOutcome::NotFound)
                }
            },
        }
    }

    /// Unfiltered content of the live source log.
    pub async fn full_log(&self) -> Result<Option<Vec<u8>>, LogSliceError> {
        self.store.read_source().await
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn last_job_id(&self) -> u64 {
        self.allocator.last()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }
}
