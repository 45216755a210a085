//! Bundling a selection of stored files into one zip archive

use crate::sweeper::DEFAULT_IO_TIMEOUT;
use crate::{Storage, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use common::file_utils::sanitize_requested_name;
use common::utils::archive_filename;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A finished archive, held in memory
#[derive(Debug)]
pub struct Archive {
    /// Suggested attachment name
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Stored names that made it into the archive, in archive order
    pub entries: Vec<String>,
}

/// Builds archives from client-chosen file selections
pub struct ArchiveBuilder {
    storage: Arc<dyn Storage>,
    io_timeout: Duration,
}

impl ArchiveBuilder {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    /// Bundle the requested files.
    ///
    /// Invalid, traversing or missing names are skipped. Fails with
    /// `StorageError::Validation` when nothing valid is left.
    pub async fn build(&self, requested: &[String]) -> StorageResult<Archive> {
        match timeout(self.io_timeout, self.build_at(requested, Utc::now())).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(self.io_timeout)),
        }
    }

    async fn build_at(&self, requested: &[String], now: DateTime<Utc>) -> StorageResult<Archive> {
        let mut retained = Vec::new();
        for name in sanitize_selection(requested) {
            match self.storage.stat(&name).await {
                Ok(Some(_)) => retained.push(name),
                Ok(None) => debug!(file = ?name, "Archive: skipping missing file"),
                Err(e) => warn!(file = ?name, error = %e, "Archive: failed to stat file"),
            }
        }
        if retained.is_empty() {
            return Err(StorageError::Validation("no valid files selected".to_string()));
        }

        let mut contents = Vec::with_capacity(retained.len());
        for name in retained {
            match self.storage.read_file(&name).await {
                Ok(bytes) => contents.push((name, bytes)),
                Err(e) => warn!(file = ?name, error = %e, "Archive: failed to read file"),
            }
        }
        if contents.is_empty() {
            return Err(StorageError::Archive(
                "none of the selected files could be read".to_string(),
            ));
        }

        let (bytes, entries) = tokio::task::spawn_blocking(move || write_zip(contents))
            .await
            .map_err(|e| StorageError::Archive(e.to_string()))??;

        Ok(Archive {
            filename: archive_filename(now),
            bytes,
            entries,
        })
    }
}

/// Reduce client-supplied names to unique safe basenames, keeping their order
pub fn sanitize_selection(requested: &[String]) -> Vec<String> {
    let mut selection: Vec<String> = Vec::with_capacity(requested.len());
    for raw in requested {
        match sanitize_requested_name(raw) {
            Ok(name) if !selection.iter().any(|s| s == name) => selection.push(name.to_string()),
            Ok(_) => {}
            Err(e) => debug!(requested = ?raw, reason = %e, "Archive: rejecting requested name"),
        }
    }
    selection
}

fn write_zip(contents: Vec<(String, Vec<u8>)>) -> StorageResult<(Vec<u8>, Vec<String>)> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::with_capacity(contents.len());

    for (name, bytes) in contents {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&bytes)?;
        entries.push(name);
    }

    let cursor = zip.finish()?;
    Ok((cursor.into_inner(), entries))
}
