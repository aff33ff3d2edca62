use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

use crate::errors::LogSliceError;
use crate::models::CanonicalDate;
use crate::storage::ArtifactStore;

/// Name of the live log the wider application appends to.
pub const SOURCE_LOG_NAME: &str = "application.log";

pub struct FsArtifactStore {
    logs_dir: PathBuf,
}

impl FsArtifactStore {
    /// Create a new FsArtifactStore rooted at `logs_dir`, creating it if needed.
    pub async fn new(logs_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&logs_dir)
            .await
            .context("Failed to create logs directory")?;
        Ok(Self { logs_dir })
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    pub fn source_path(&self) -> PathBuf {
        self.logs_dir.join(SOURCE_LOG_NAME)
    }

    pub fn artifact_path(&self, date: &CanonicalDate) -> PathBuf {
        self.logs_dir.join(date.artifact_file_name())
    }
}

/// Read a regular file, treating a missing path or a non-file as absent.
async fn read_if_file(path: &Path) -> Result<Option<Vec<u8>>, LogSliceError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LogSliceError::Storage(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn read_source(&self) -> Result<Option<Vec<u8>>, LogSliceError> {
        read_if_file(&self.source_path()).await
    }

    async fn extract(&self, date: &CanonicalDate) -> Result<u64, LogSliceError> {
        let source_path = self.source_path();
        let artifact_path = self.artifact_path(date);

        let source = tokio::fs::File::open(&source_path).await.map_err(|e| {
            LogSliceError::Storage(format!(
                "Failed to open source log {}: {}",
                source_path.display(),
                e
            ))
        })?;
        let target = tokio::fs::File::create(&artifact_path).await.map_err(|e| {
            LogSliceError::Storage(format!(
                "Failed to create artifact {}: {}",
                artifact_path.display(),
                e
            ))
        })?;

        let mut reader = BufReader::new(source);
        let mut writer = BufWriter::new(target);
        let prefix = date.to_string();
        let mut line = Vec::new();
        let mut copied = 0u64;

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            if line.starts_with(prefix.as_bytes()) {
                writer.write_all(&line).await?;
                if !line.ends_with(b"\n") {
                    writer.write_all(b"\n").await?;
                }
                copied += 1;
            }
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        Ok(copied)
    }

    async fn read_artifact(&self, date: &CanonicalDate) -> Result<Option<Vec<u8>>, LogSliceError> {
        read_if_file(&self.artifact_path(date)).await
    }
}
