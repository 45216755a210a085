//! Periodic removal of expired uploads

use crate::metadata::MetadataStore;
use crate::settings::SettingsStore;
use crate::{DeleteOutcome, Storage};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Default period between sweeps
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default bound on directory enumeration during a sweep
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Files deleted (or already gone) whose records were dropped
    pub removed: Vec<String>,
    /// Files that could not be deleted
    pub failed: usize,
}

/// Deletes files older than the configured retention and prunes their records
pub struct Sweeper {
    storage: Arc<dyn Storage>,
    metadata: Arc<MetadataStore>,
    settings: Arc<SettingsStore>,
    interval: Duration,
    io_timeout: Duration,
}

impl Sweeper {
    pub fn new(
        storage: Arc<dyn Storage>,
        metadata: Arc<MetadataStore>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            storage,
            metadata,
            settings,
            interval: DEFAULT_SWEEP_INTERVAL,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }

    /// Period between sweeps. Zero falls back to the default, since
    /// `tokio::time::interval` panics on a zero period.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            warn!("Sweep interval is 0, using default of 60 seconds");
            self.interval = DEFAULT_SWEEP_INTERVAL;
        } else {
            self.interval = interval;
        }
        self
    }

    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    /// Sweep against the current time
    pub async fn run(&self) -> SweepReport {
        self.run_at(Utc::now()).await
    }

    /// Sweep as if the current time were `now`.
    ///
    /// A file is removed only when its age is strictly greater than the
    /// retention. Single failures are logged and skipped; a failed listing
    /// ends the run and the next tick retries.
    pub async fn run_at(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        let settings = self.settings.load().await;
        let Some(retention) = settings.retention() else {
            debug!("Cleanup disabled, skipping sweep");
            return report;
        };

        let entries = match timeout(self.io_timeout, self.storage.list()).await {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                error!(error = %e, "Cleanup: failed to list storage directory");
                return report;
            }
            Err(_) => {
                error!(
                    timeout_secs = self.io_timeout.as_secs(),
                    "Cleanup: listing storage directory timed out"
                );
                return report;
            }
        };

        for entry in entries {
            if now.signed_duration_since(entry.modified) <= retention {
                continue;
            }
            match self.storage.delete(&entry.name).await {
                Ok(DeleteOutcome::Deleted) => {
                    info!(file = ?entry.name, modified = %entry.modified, "Cleanup: deleted expired file");
                    report.removed.push(entry.name);
                }
                Ok(DeleteOutcome::NotFound) => {
                    debug!(file = ?entry.name, "Cleanup: file already gone");
                    report.removed.push(entry.name);
                }
                Err(e) => {
                    warn!(file = ?entry.name, error = %e, "Cleanup: failed to delete");
                    report.failed += 1;
                }
            }
        }

        if let Err(e) = self.metadata.remove_many(&report.removed).await {
            error!(error = %e, "Cleanup: failed to update metadata");
        }

        report
    }

    /// Run a sweep now and then once per interval until the task is aborted.
    /// Ticks missed while a sweep is running are skipped, so runs never overlap.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                interval_secs = self.interval.as_secs(),
                "Cleanup loop started"
            );

            loop {
                ticker.tick().await;
                let report = self.run().await;
                if !report.removed.is_empty() || report.failed > 0 {
                    info!(
                        removed = report.removed.len(),
                        failed = report.failed,
                        "Cleanup sweep finished"
                    );
                }
            }
        })
    }
}
