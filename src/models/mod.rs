pub mod config;
pub mod date;
pub mod job;

pub use config::ServiceConfig;
pub use date::{normalize, CanonicalDate, Clock, FixedClock, SystemClock};
pub use job::{ArtifactOutcome, JobId, JobRecord, JobStatus, StatusReport};
