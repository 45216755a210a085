pub mod file_utils;
pub mod identity;
pub mod settings;
pub mod utils;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the `/files` listing
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub uploaded_by: Option<String>, // identity of the uploader, if recorded
    pub uploaded_at: DateTime<Utc>,  // falls back to `modified` when no record exists
}

/// A stored file as reported back to the uploader
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String, // final name after conflict resolution
    pub size: u64,
}

/// Response body of a successful batch upload
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    pub success: bool,
    pub files: Vec<UploadedFile>,
}

/// Request body for bundling several files into one archive
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ZipDownloadRequest {
    #[serde(default)]
    pub filenames: Vec<String>,
}

/// Cleanup settings as exchanged with the client
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub cleanup_after_minutes: u32,
}

/// Settings update as received; the value is validated by the server
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdateRequest {
    #[serde(default)]
    pub cleanup_after_minutes: serde_json::Value,
}

/// Response of `/api/my-ip`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MyIpResponse {
    pub ip: Option<String>,
}

/// Response of `/api/server-info`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ServerInfoResponse {
    pub url: String,      // address other devices should open
    pub host: String,     // Host header of the request
    pub protocol: String, // "http" or "https"
}

/// Response from health check endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String, // "ok" when healthy
}

/// JSON error body returned by every failing API route
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
