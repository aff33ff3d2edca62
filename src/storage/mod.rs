pub mod jobs;
pub mod logs;

use async_trait::async_trait;

use crate::errors::LogSliceError;
use crate::models::CanonicalDate;

/// The directory holding the live source log and the per-date artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Full content of the live source log, `None` if it does not exist.
    async fn read_source(&self) -> Result<Option<Vec<u8>>, LogSliceError>;

    /// Copy every source line starting with `date` into that date's artifact,
    /// replacing any previous artifact. Returns the number of lines copied.
    ///
    /// The artifact is fully flushed when this returns `Ok`.
    async fn extract(&self, date: &CanonicalDate) -> Result<u64, LogSliceError>;

    /// Content of the artifact for `date`, `None` if it does not exist.
    async fn read_artifact(&self, date: &CanonicalDate) -> Result<Option<Vec<u8>>, LogSliceError>;
}
