/// Default upload directory, relative to the working directory
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: &str = "3000";

/// Default seconds between cleanup sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: &str = "60";

/// Default bound on directory and archive I/O, in seconds
pub const DEFAULT_IO_TIMEOUT_SECS: &str = "30";

/// Explicit upload directory
pub const ENV_UPLOADS: &str = "LANFILE_UPLOADS";

/// Alternative name for the upload directory variable
pub const ENV_UPLOADS_DIR: &str = "UPLOADS_DIR";

/// Application data directory; uploads go to its `uploads` subdirectory
pub const ENV_USER_DATA: &str = "LANFILE_USER_DATA";

pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "SERVER_HOST";
pub const ENV_PUBLIC_URL: &str = "LANFILE_PUBLIC_URL";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "LANFILE_SWEEP_INTERVAL_SECS";
pub const ENV_IO_TIMEOUT_SECS: &str = "LANFILE_IO_TIMEOUT_SECS";
