//! Upload ingestion with collision-safe naming

use crate::metadata::{MetadataRecord, MetadataStore};
use crate::sweeper::DEFAULT_IO_TIMEOUT;
use crate::{fill_file, is_record_slot, Storage, StorageError, StorageResult};
use chrono::Utc;
use common::file_utils::{basename, numbered_name, recover_utf8_name, split_name, validate_filename};
use common::UploadedFile;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

/// Maximum number of files accepted in one upload
pub const MAX_FILES_PER_BATCH: usize = 50;

/// Maximum size of a single uploaded file (500 MiB)
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// One file of an upload batch
pub struct IncomingFile<R> {
    /// Filename as sent by the client
    pub declared_name: String,
    /// Size announced for the content
    pub size: u64,
    pub content: R,
}

/// Stores uploaded batches in the drop directory and records who sent them
pub struct Ingestor {
    storage: Arc<dyn Storage>,
    metadata: Arc<MetadataStore>,
    // Serializes name probing and creation within the directory
    naming: Mutex<()>,
    max_files: usize,
    max_file_size: u64,
    io_timeout: Duration,
}

impl Ingestor {
    pub fn new(storage: Arc<dyn Storage>, metadata: Arc<MetadataStore>) -> Self {
        Self {
            storage,
            metadata,
            naming: Mutex::new(()),
            max_files: MAX_FILES_PER_BATCH,
            max_file_size: MAX_FILE_SIZE,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Bound on copying one file into the directory
    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn with_limits(mut self, max_files: usize, max_file_size: u64) -> Self {
        self.max_files = max_files;
        self.max_file_size = max_file_size;
        self
    }

    /// Store a batch uploaded by `identity`.
    ///
    /// Limits and names are checked for the whole batch before anything is
    /// written. After that each file is independent: a failure stops the batch
    /// but files already stored stay stored and recorded.
    pub async fn ingest<R>(
        &self,
        batch: Vec<IncomingFile<R>>,
        identity: Option<&str>,
    ) -> StorageResult<Vec<UploadedFile>>
    where
        R: AsyncRead + Send + Unpin,
    {
        if batch.len() > self.max_files {
            return Err(StorageError::CountLimit {
                count: batch.len(),
                max: self.max_files,
            });
        }
        if let Some(oversized) = batch.iter().find(|f| f.size > self.max_file_size) {
            return Err(StorageError::SizeLimit {
                name: oversized.declared_name.clone(),
                max: self.max_file_size,
            });
        }
        let names = batch
            .iter()
            .map(|f| intended_name(&f.declared_name))
            .collect::<StorageResult<Vec<_>>>()?;

        let mut stored = Vec::with_capacity(batch.len());
        for (file, name) in batch.into_iter().zip(names) {
            stored.push(self.store_one(&name, file.content, identity).await?);
        }
        Ok(stored)
    }

    async fn store_one<R>(
        &self,
        name: &str,
        content: R,
        identity: Option<&str>,
    ) -> StorageResult<UploadedFile>
    where
        R: AsyncRead + Send + Unpin,
    {
        let (base, ext) = split_name(name);

        // Only the name claim is serialized; copies of different uploads overlap
        let (final_name, file) = {
            let _guard = self.naming.lock().await;
            self.claim_unique(base, ext).await?
        };

        // One byte past the limit is enough to detect an understated size
        let mut limited = content.take(self.max_file_size + 1);
        let copied = match timeout(self.io_timeout, fill_file(file, &mut limited)).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(self.io_timeout)),
        };

        let size = match copied {
            Ok(size) if size <= self.max_file_size => size,
            Ok(_) => {
                self.discard(&final_name).await;
                return Err(StorageError::SizeLimit {
                    name: name.to_string(),
                    max: self.max_file_size,
                });
            }
            Err(e) => {
                self.discard(&final_name).await;
                return Err(e);
            }
        };

        self.metadata
            .upsert(
                &final_name,
                MetadataRecord {
                    uploaded_by: identity.map(str::to_string),
                    uploaded_at: Utc::now(),
                    size,
                },
            )
            .await?;

        info!(
            filename = ?final_name,
            size,
            uploaded_by = ?identity,
            "Stored uploaded file"
        );
        Ok(UploadedFile {
            name: final_name,
            size,
        })
    }

    /// Create the first free name of `base.ext, base_1.ext, ...`
    async fn claim_unique(
        &self,
        base: &str,
        ext: &str,
    ) -> StorageResult<(String, tokio::fs::File)> {
        let mut attempt = 0u32;
        loop {
            let candidate = numbered_name(base, ext, attempt);
            attempt += 1;

            if is_record_slot(&candidate) || self.storage.stat(&candidate).await?.is_some() {
                continue;
            }
            // Exclusive create still guards against writers outside this process
            match self.storage.create_new(&candidate).await {
                Ok(file) => return Ok((candidate, file)),
                Err(StorageError::AlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    async fn discard(&self, name: &str) {
        if let Err(e) = self.storage.delete(name).await {
            warn!(file = ?name, error = %e, "Failed to remove rejected upload");
        }
    }
}

/// Filename the uploader meant: repaired encoding, reduced to a basename
fn intended_name(declared: &str) -> StorageResult<String> {
    let recovered = recover_utf8_name(declared);
    let name = basename(&recovered);
    validate_filename(name)?;
    Ok(name.to_string())
}
