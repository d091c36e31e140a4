//! Local staging of synthesized audio.
//!
//! Synthesized audio is streamed to a file under the staging directory before
//! it is uploaded. Each [`StagedFile`] removes its file when dropped, so the
//! file is cleaned up on every exit path of the request that created it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to create staging directory {0}: {1}")]
    CreateDir(String, String),

    #[error("Failed to create staged file {0}: {1}")]
    CreateFile(String, String),

    #[error("Failed to write staged file {0}: {1}")]
    Write(String, String),

    #[error("Failed to read staged file {0}: {1}")]
    Read(String, String),

    #[error("Staged file {0} is already finalized")]
    Finalized(String),
}

pub type StagingResult<T> = Result<T, StagingError>;

/// Process-wide staging directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the staging directory if it does not exist yet.
    ///
    /// Safe to call concurrently from many requests.
    pub async fn ensure_dir(&self) -> StagingResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StagingError::CreateDir(self.dir.display().to_string(), e.to_string()))
    }

    /// Create a new, uniquely named file `audio_{uuid}.{extension}`.
    pub async fn create_file(&self, extension: &str) -> StagingResult<StagedFile> {
        self.ensure_dir().await?;

        let file_name = format!("audio_{}.{}", Uuid::new_v4().simple(), extension);
        let path = self.dir.join(&file_name);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StagingError::CreateFile(path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), "Created staged file");

        Ok(StagedFile {
            path,
            file_name,
            file: Some(file),
            bytes_written: 0,
        })
    }
}

/// A file in the staging area, deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    file_name: String,
    file: Option<File>,
    bytes_written: usize,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the file, e.g. `audio_3f2a....mp3`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Append a chunk to the file.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> StagingResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StagingError::Finalized(self.path.display().to_string()))?;
        file.write_all(chunk)
            .await
            .map_err(|e| StagingError::Write(self.path.display().to_string(), e.to_string()))?;
        self.bytes_written += chunk.len();
        Ok(())
    }

    /// Flush and sync the file to disk and close the write handle.
    ///
    /// The contents are only read back after this returns.
    pub async fn finish(&mut self) -> StagingResult<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        let path = self.path.display().to_string();
        file.flush()
            .await
            .map_err(|e| StagingError::Write(path.clone(), e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| StagingError::Write(path, e.to_string()))?;
        Ok(())
    }

    /// Read the complete contents back, finishing the file first if needed.
    pub async fn read_all(&mut self) -> StagingResult<Bytes> {
        self.finish().await?;
        let data = fs::read(&self.path)
            .await
            .map_err(|e| StagingError::Read(self.path.display().to_string(), e.to_string()))?;
        Ok(Bytes::from(data))
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // Close the handle before unlinking.
        drop(self.file.take());
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove staged file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path().join("nested").join("staging"));

        area.ensure_dir().await.unwrap();
        area.ensure_dir().await.unwrap();
        assert!(area.dir().is_dir());
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path());

        let mut staged = area.create_file("mp3").await.unwrap();
        assert!(staged.file_name().starts_with("audio_"));
        assert!(staged.file_name().ends_with(".mp3"));

        staged.write_chunk(b"hello ").await.unwrap();
        staged.write_chunk(b"world").await.unwrap();
        assert_eq!(staged.bytes_written(), 11);

        let data = staged.read_all().await.unwrap();
        assert_eq!(&data[..], b"hello world");
    }

    #[tokio::test]
    async fn test_write_after_finish_fails() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path());

        let mut staged = area.create_file("mp3").await.unwrap();
        staged.finish().await.unwrap();
        assert!(matches!(
            staged.write_chunk(b"late").await,
            Err(StagingError::Finalized(_))
        ));
    }

    #[tokio::test]
    async fn test_file_removed_on_drop() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path());

        let path = {
            let mut staged = area.create_file("mp3").await.unwrap();
            staged.write_chunk(b"data").await.unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_file_names_are_unique() {
        let temp = TempDir::new().unwrap();
        let area = StagingArea::new(temp.path());

        let a = area.create_file("mp3").await.unwrap();
        let b = area.create_file("mp3").await.unwrap();
        assert_ne!(a.file_name(), b.file_name());
    }

    #[tokio::test]
    async fn test_create_dir_failure() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let area = StagingArea::new(blocker.join("staging"));
        assert!(matches!(
            area.create_file("mp3").await,
            Err(StagingError::CreateDir(_, _))
        ));
    }
}
