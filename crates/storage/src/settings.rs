//! Cleanup settings, persisted as one JSON slot

use crate::{StorageError, StorageResult};
use common::settings::{
    parse_minutes, validate_minutes, DEFAULT_CLEANUP_AFTER_MINUTES, MAX_CLEANUP_AFTER_MINUTES,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Retention policy for uploaded files
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Minutes after which an unmodified file is swept; 0 disables expiry
    pub cleanup_after_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cleanup_after_minutes: DEFAULT_CLEANUP_AFTER_MINUTES,
        }
    }
}

impl Settings {
    /// Age beyond which files expire, or `None` when expiry is disabled
    pub fn retention(&self) -> Option<chrono::Duration> {
        if self.cleanup_after_minutes == 0 {
            None
        } else {
            Some(chrono::Duration::minutes(i64::from(self.cleanup_after_minutes)))
        }
    }
}

/// Config slot manager
pub struct SettingsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings. Missing, unparseable or out-of-range values yield the
    /// default, which is then written back so the slot exists afterwards.
    pub async fn load(&self) -> Settings {
        let _guard = self.lock.lock().await;
        if let Some(settings) = Self::read_slot(&self.path).await {
            return settings;
        }

        let settings = Settings::default();
        match Self::write_slot(&self.path, &settings).await {
            Ok(()) => info!(
                path = ?self.path,
                cleanup_after_minutes = settings.cleanup_after_minutes,
                "Wrote default cleanup settings"
            ),
            Err(e) => warn!(path = ?self.path, error = %e, "Failed to write default settings"),
        }
        settings
    }

    /// Validate and persist a new retention value
    pub async fn update(&self, minutes: i64) -> StorageResult<Settings> {
        let cleanup_after_minutes = validate_minutes(minutes).ok_or_else(|| {
            StorageError::Validation(format!(
                "Invalid value (0-{} minutes)",
                MAX_CLEANUP_AFTER_MINUTES
            ))
        })?;
        let settings = Settings {
            cleanup_after_minutes,
        };

        let _guard = self.lock.lock().await;
        Self::write_slot(&self.path, &settings).await?;
        Ok(settings)
    }

    async fn read_slot(path: &Path) -> Option<Settings> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read settings, using default");
                return None;
            }
        };

        let value: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = ?path, error = %e, "Settings are corrupt, using default");
                return None;
            }
        };

        let minutes = value.get("cleanupAfterMinutes").and_then(parse_minutes);
        match minutes.and_then(validate_minutes) {
            Some(cleanup_after_minutes) => Some(Settings {
                cleanup_after_minutes,
            }),
            None => {
                warn!(path = ?path, "Stored cleanup value is missing or out of range, using default");
                None
            }
        }
    }

    async fn write_slot(path: &Path, settings: &Settings) -> StorageResult<()> {
        let settings_json = serde_json::to_string_pretty(settings)?;

        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(settings_json.as_bytes()).await?;
        file.sync_all().await?;

        Ok(())
    }
}
