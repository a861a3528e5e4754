//! Persistence seam for downloaded payloads.
//!
//! The engine never touches the filesystem directly; it hands (name, bytes)
//! to a [`Store`] injected at construction time, so tests can substitute
//! failing or recording doubles and callers decide where payloads land.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors produced while persisting a payload.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File system error (directory creation, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Writes a named payload to a content store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persists `content` under `name`, creating any required containing
    /// directories, and returns the resulting location.
    ///
    /// Same-name writes overwrite the previous content.
    async fn store(&self, name: &str, content: &[u8]) -> Result<PathBuf, StoreError>;
}

/// Filesystem [`Store`] rooted at a caller-chosen directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory payloads are written under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Store for FsStore {
    #[instrument(skip(self, content), fields(root = %self.root.display(), bytes = content.len()))]
    async fn store(&self, name: &str, content: &[u8]) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;

        let path = self.root.join(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        debug!(path = %path.display(), "payload written");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_writes_payload() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let path = store.store("report.pdf", b"payload").await.unwrap();

        assert_eq!(path, dir.path().join("report.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_store_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FsStore::new(&nested);

        let path = store.store("file.bin", b"x").await.unwrap();

        assert!(path.exists());
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_same_name_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        store.store("f.txt", b"first").await.unwrap();
        let path = store.store("f.txt", b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_unwritable_root_is_io_error() {
        // A file where the root directory should be forces create_dir_all to fail.
        let dir = TempDir::new().unwrap();
        let blocking_file = dir.path().join("occupied");
        std::fs::write(&blocking_file, b"").unwrap();

        let store = FsStore::new(&blocking_file);
        let err = store.store("f.txt", b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
