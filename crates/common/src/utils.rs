use chrono::{DateTime, Utc};

/// Attachment name for a bundle built at `now`, e.g. `download_2024-05-01-13-45-09.zip`
pub fn archive_filename(now: DateTime<Utc>) -> String {
    format!("download_{}.zip", now.format("%Y-%m-%d-%H-%M-%S"))
}
