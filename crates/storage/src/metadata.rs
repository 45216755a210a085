//! Provenance records for stored files, persisted as one JSON slot

use crate::StorageResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Who uploaded a file, when, and how large it was
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub uploaded_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub size: u64,
}

/// Stored filename -> provenance
pub type FileMetadata = BTreeMap<String, MetadataRecord>;

/// Metadata slot manager.
///
/// Records may outlive their files (manual deletes, crashes); readers join
/// them against the directory listing instead of trusting them.
pub struct MetadataStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole mapping. Never fails: a missing slot is empty and a
    /// corrupt one is logged and treated as empty.
    pub async fn load(&self) -> FileMetadata {
        let _guard = self.lock.lock().await;
        Self::read_slot(&self.path).await
    }

    /// Replace the whole mapping
    pub async fn save(&self, metadata: &FileMetadata) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        Self::write_slot(&self.path, metadata).await
    }

    /// Read-modify-write under the store lock. The mapping is reloaded inside
    /// the critical section, so concurrent updates never overwrite each other.
    /// `f` returns whether it changed anything; nothing is written otherwise.
    pub async fn update<F>(&self, f: F) -> StorageResult<bool>
    where
        F: FnOnce(&mut FileMetadata) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        let mut metadata = Self::read_slot(&self.path).await;
        let changed = f(&mut metadata);
        if changed {
            Self::write_slot(&self.path, &metadata).await?;
        }
        Ok(changed)
    }

    /// Insert or replace the record for `name`
    pub async fn upsert(&self, name: &str, record: MetadataRecord) -> StorageResult<()> {
        self.update(|metadata| {
            metadata.insert(name.to_string(), record);
            true
        })
        .await
        .map(|_| ())
    }

    /// Drop the records of `names`, writing the slot at most once
    pub async fn remove_many(&self, names: &[String]) -> StorageResult<usize> {
        if names.is_empty() {
            return Ok(0);
        }
        let mut removed = 0;
        self.update(|metadata| {
            for name in names {
                if metadata.remove(name).is_some() {
                    removed += 1;
                }
            }
            removed > 0
        })
        .await?;
        Ok(removed)
    }

    async fn read_slot(path: &Path) -> FileMetadata {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return FileMetadata::new(),
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read metadata, treating as empty");
                return FileMetadata::new();
            }
        };

        let raw: BTreeMap<String, Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = ?path, error = %e, "Metadata is corrupt, treating as empty");
                return FileMetadata::new();
            }
        };

        // A single malformed record should not cost every other record
        raw.into_iter()
            .filter_map(|(name, value)| match serde_json::from_value(value) {
                Ok(record) => Some((name, record)),
                Err(e) => {
                    debug!(file = ?name, error = %e, "Dropping malformed metadata record");
                    None
                }
            })
            .collect()
    }

    /// Write with fsync so the slot is on disk before the lock is released
    async fn write_slot(path: &Path, metadata: &FileMetadata) -> StorageResult<()> {
        let metadata_json = serde_json::to_string_pretty(metadata)?;

        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(metadata_json.as_bytes()).await?;
        file.sync_all().await?;

        Ok(())
    }
}
