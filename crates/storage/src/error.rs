//! Storage error types.

use common::file_utils::FilenameValidationError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the drop directory and its record stores.
///
/// Corrupt record slots never show up here: the stores log them and fall
/// back to an empty mapping or the default settings.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    Validation(String),

    #[error("too many files: {count} (max {max})")]
    CountLimit { count: usize, max: usize },

    #[error("file too large: {name} (max {max} bytes)")]
    SizeLimit { name: String, max: u64 },

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("file already exists: {0}")]
    AlreadyExists(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<FilenameValidationError> for StorageError {
    fn from(e: FilenameValidationError) -> Self {
        StorageError::Validation(e.message().to_string())
    }
}

impl From<zip::result::ZipError> for StorageError {
    fn from(e: zip::result::ZipError) -> Self {
        StorageError::Archive(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
