//! Record store: the system of record for the collection.
//!
//! Every `save` replaces the whole persisted collection. The JSON file store
//! writes a sibling temporary file and renames it over the target, so a crash
//! mid-write leaves either the old or the new document, never a truncated one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pokedex_core::{Record, RecordCollection, StoreError};
use tokio::sync::RwLock;

/// Persistent medium holding the full record collection.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the full collection, in insertion order.
    async fn load(&self) -> Result<RecordCollection, StoreError>;

    /// Overwrite the persisted collection.
    async fn save(&self, records: &[Record]) -> Result<(), StoreError>;

    /// Human-readable location for logs and error messages.
    fn location(&self) -> String;
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

/// Store backed by a JSON document containing a top-level array of records.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, reason: impl ToString) -> StoreError {
        StoreError::Write {
            location: self.location(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> Result<RecordCollection, StoreError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoreError::Read {
                location: self.location(),
                reason: e.to_string(),
            })?;

        serde_json::from_str(&raw).map_err(|e| StoreError::Malformed {
            location: self.location(),
            reason: e.to_string(),
        })
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let body = serde_json::to_vec(records).map_err(|e| self.write_error(e))?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, &body)
            .await
            .map_err(|e| self.write_error(e))?;

        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            // Best effort: leave no stray temp file behind.
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(self.write_error(e));
        }

        tracing::debug!(path = %self.path.display(), count = records.len(), "Record store saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Volatile store for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<RecordCollection>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: RecordCollection) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Current contents, for assertions.
    pub async fn snapshot(&self) -> RecordCollection {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn load(&self) -> Result<RecordCollection, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        *self.records.write().await = records.to_vec();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
