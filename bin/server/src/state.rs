//! Server application state management

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storage::{
    ArchiveBuilder, FilesystemStorage, Ingestor, MetadataStore, SettingsStore, Storage, Sweeper,
    StorageError, StorageResult, CONFIG_FILE, METADATA_FILE,
};

/// Components shared by every request handler
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub metadata: Arc<MetadataStore>,
    pub settings: Arc<SettingsStore>,
    pub ingestor: Ingestor,
    pub archives: ArchiveBuilder,
    /// Display address; derived from the request when unset
    pub public_url: Option<String>,
    /// Bound on directory enumeration, stat and file I/O
    pub io_timeout: Duration,
}

impl AppState {
    /// Wire all stores to one drop directory
    pub fn new(uploads_dir: impl Into<PathBuf>, io_timeout: Duration) -> Self {
        let uploads_dir = uploads_dir.into();
        let storage = Arc::new(FilesystemStorage::new(uploads_dir.clone()));
        Self::with_storage(storage, uploads_dir, io_timeout)
    }

    /// Same as `new` with the record slots in `uploads_dir` and payload files
    /// served by `storage`
    pub fn with_storage(
        storage: Arc<dyn Storage>,
        uploads_dir: impl Into<PathBuf>,
        io_timeout: Duration,
    ) -> Self {
        let uploads_dir = uploads_dir.into();
        let metadata = Arc::new(MetadataStore::new(uploads_dir.join(METADATA_FILE)));
        let settings = Arc::new(SettingsStore::new(uploads_dir.join(CONFIG_FILE)));

        Self {
            ingestor: Ingestor::new(storage.clone(), metadata.clone()).with_io_timeout(io_timeout),
            archives: ArchiveBuilder::new(storage.clone()).with_io_timeout(io_timeout),
            storage,
            metadata,
            settings,
            public_url: None,
            io_timeout,
        }
    }

    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = Some(public_url.into());
        self
    }

    /// Run a storage call under the I/O timeout
    pub async fn bounded<T, F>(&self, operation: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        tokio::time::timeout(self.io_timeout, operation)
            .await
            .unwrap_or_else(|_| Err(StorageError::Timeout(self.io_timeout)))
    }

    /// Cleanup sweeper over the same stores
    pub fn sweeper(&self, interval: Duration) -> Sweeper {
        Sweeper::new(
            self.storage.clone(),
            self.metadata.clone(),
            self.settings.clone(),
        )
        .with_interval(interval)
        .with_io_timeout(self.io_timeout)
    }
}
