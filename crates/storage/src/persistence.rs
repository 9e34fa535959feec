use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot database: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("snapshot encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The persistence medium behind the log store: one namespaced record whose
/// value is the serialized log sequence. Read once at open, written on every
/// mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotPersistence: Send + Sync {
    /// Returns the stored snapshot, or `None` if nothing was ever written.
    async fn load(&self) -> Result<Option<String>, StorageError>;

    async fn save(&self, snapshot: &str) -> Result<(), StorageError>;
}

/// Snapshot kept in a single JSON file on disk.
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotPersistence for JsonFilePersistence {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, snapshot: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, snapshot).await?;
        Ok(())
    }
}

/// Volatile snapshot holder. Used by tests and as the degraded fallback when
/// no durable medium is configured.
#[derive(Default)]
pub struct MemoryPersistence {
    inner: Mutex<Option<String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotPersistence for MemoryPersistence {
    async fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, snapshot: &str) -> Result<(), StorageError> {
        *self.inner.lock().await = Some(snapshot.to_string());
        Ok(())
    }
}
