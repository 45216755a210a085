//! Filesystem-based storage implementation

use crate::{is_record_slot, DeleteOutcome, Storage, StorageError, StorageResult, StoredFile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Drop directory on the local filesystem
pub struct FilesystemStorage {
    data_dir: PathBuf,
}

impl FilesystemStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    fn to_stored_file(name: String, metadata: &std::fs::Metadata) -> StorageResult<StoredFile> {
        let modified: DateTime<Utc> = metadata.modified()?.into();
        Ok(StoredFile {
            name,
            size: metadata.len(),
            modified,
        })
    }

    fn not_found_or_io(name: &str, e: std::io::Error) -> StorageError {
        if e.kind() == ErrorKind::NotFound {
            StorageError::NotFound(name.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

#[async_trait]
impl Storage for FilesystemStorage {
    async fn ensure_exists(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<StoredFile>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.data_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!(path = ?entry.path(), "Skipping entry with non UTF-8 name");
                continue;
            };
            if is_record_slot(&name) {
                continue;
            }

            // Follow symlinks like a plain stat would
            let metadata = match tokio::fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!(file = ?name, error = %e, "Skipping entry that could not be stat'ed");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            match Self::to_stored_file(name, &metadata) {
                Ok(file) => files.push(file),
                Err(e) => warn!(error = %e, "Skipping entry without modification time"),
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn stat(&self, name: &str) -> StorageResult<Option<StoredFile>> {
        if is_record_slot(name) {
            return Ok(None);
        }
        match tokio::fs::metadata(self.file_path(name)).await {
            Ok(metadata) if metadata.is_file() => {
                Self::to_stored_file(name.to_string(), &metadata).map(Some)
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_new(&self, name: &str) -> StorageResult<tokio::fs::File> {
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.file_path(name))
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(name.to_string())
                } else {
                    StorageError::Io(e)
                }
            })
    }

    async fn read_file(&self, name: &str) -> StorageResult<Vec<u8>> {
        tokio::fs::read(self.file_path(name))
            .await
            .map_err(|e| Self::not_found_or_io(name, e))
    }

    async fn open_file(&self, name: &str) -> StorageResult<tokio::fs::File> {
        tokio::fs::File::open(self.file_path(name))
            .await
            .map_err(|e| Self::not_found_or_io(name, e))
    }

    async fn delete(&self, name: &str) -> StorageResult<DeleteOutcome> {
        match tokio::fs::remove_file(self.file_path(name)).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DeleteOutcome::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CONFIG_FILE, METADATA_FILE};

    async fn storage_in(dir: &Path) -> FilesystemStorage {
        let storage = FilesystemStorage::new(dir.join("uploads"));
        storage.ensure_exists().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn list_skips_record_slots_and_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage_in(tmp.path()).await;
        let root = storage.data_dir().to_path_buf();

        std::fs::write(root.join("b.txt"), b"bb").unwrap();
        std::fs::write(root.join("a.txt"), b"a").unwrap();
        std::fs::write(root.join(METADATA_FILE), b"{}").unwrap();
        std::fs::write(root.join(CONFIG_FILE), b"{}").unwrap();
        std::fs::create_dir(root.join("nested")).unwrap();

        let files = storage.list().await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(files[1].size, 2);
    }

    #[tokio::test]
    async fn stat_reports_only_regular_payload_files() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage_in(tmp.path()).await;
        let root = storage.data_dir().to_path_buf();

        std::fs::write(root.join("a.txt"), b"hello").unwrap();
        std::fs::write(root.join(METADATA_FILE), b"{}").unwrap();
        std::fs::create_dir(root.join("dir")).unwrap();

        let stat = storage.stat("a.txt").await.unwrap().unwrap();
        assert_eq!(stat.size, 5);
        assert!(storage.stat("missing.txt").await.unwrap().is_none());
        assert!(storage.stat("dir").await.unwrap().is_none());
        assert!(storage.stat(METADATA_FILE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_new_refuses_existing_names() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage_in(tmp.path()).await;

        let mut first: &[u8] = b"first";
        assert_eq!(storage.write_new("a.txt", &mut first).await.unwrap(), 5);

        let mut second: &[u8] = b"second";
        let err = storage.write_new("a.txt", &mut second).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(name) if name == "a.txt"));
        assert_eq!(storage.read_file("a.txt").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn delete_reports_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage_in(tmp.path()).await;

        let mut content: &[u8] = b"x";
        storage.write_new("a.txt", &mut content).await.unwrap();

        assert_eq!(storage.delete("a.txt").await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(storage.delete("a.txt").await.unwrap(), DeleteOutcome::NotFound);
        assert!(matches!(
            storage.read_file("a.txt").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
