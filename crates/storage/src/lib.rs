pub mod archive;
pub mod error;
pub mod filesystem;
pub mod ingest;
pub mod metadata;
pub mod settings;
pub mod sweeper;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;
use tracing::warn;

pub use archive::{Archive, ArchiveBuilder};
pub use error::{StorageError, StorageResult};
pub use filesystem::FilesystemStorage;
pub use ingest::{IncomingFile, Ingestor, MAX_FILES_PER_BATCH, MAX_FILE_SIZE};
pub use metadata::{FileMetadata, MetadataRecord, MetadataStore};
pub use settings::{Settings, SettingsStore};
pub use sweeper::{SweepReport, Sweeper};

/// Record slot holding the provenance mapping
pub const METADATA_FILE: &str = "metadata.json";

/// Record slot holding the cleanup settings
pub const CONFIG_FILE: &str = "config.json";

/// Whether `name` is one of the record slots kept alongside the payload files
pub fn is_record_slot(name: &str) -> bool {
    name == METADATA_FILE || name == CONFIG_FILE
}

/// A payload file in the drop directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Result of deleting a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Storage backend trait for the drop directory.
///
/// Every `name` is an opaque basename. Callers sanitize client input before
/// it gets here; implementations only join it onto their root.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the directory if it does not exist yet
    async fn ensure_exists(&self) -> StorageResult<()>;

    /// Regular payload files, record slots excluded, sorted by name
    async fn list(&self) -> StorageResult<Vec<StoredFile>>;

    /// Stat one payload file; `None` if missing or not a regular file
    async fn stat(&self, name: &str) -> StorageResult<Option<StoredFile>>;

    /// Create an empty file under `name`, failing with
    /// `StorageError::AlreadyExists` if the name is taken
    async fn create_new(&self, name: &str) -> StorageResult<tokio::fs::File>;

    /// Create `name` exclusively and fill it from `content`.
    /// A failed copy removes the partial file.
    async fn write_new(
        &self,
        name: &str,
        content: &mut (dyn AsyncRead + Send + Unpin),
    ) -> StorageResult<u64> {
        let file = self.create_new(name).await?;
        match fill_file(file, content).await {
            Ok(written) => Ok(written),
            Err(e) => {
                if let Err(remove_err) = self.delete(name).await {
                    warn!(file = ?name, error = %remove_err, "Failed to remove partially written file");
                }
                Err(e)
            }
        }
    }

    /// Read a whole file into memory
    async fn read_file(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Open a file for streaming
    async fn open_file(&self, name: &str) -> StorageResult<tokio::fs::File>;

    /// Delete a file
    async fn delete(&self, name: &str) -> StorageResult<DeleteOutcome>;
}

/// Copy `content` into a freshly created file and flush it to disk
pub async fn fill_file(
    mut file: tokio::fs::File,
    content: &mut (dyn AsyncRead + Send + Unpin),
) -> StorageResult<u64> {
    let written = tokio::io::copy(content, &mut file).await?;
    file.sync_all().await?;
    Ok(written)
}
