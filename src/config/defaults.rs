//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Config discovery
// ============================================================================

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV_VAR: &str = "ONEGEO_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "onegeo.toml";

/// Environment overrides applied after the file is loaded.
pub const ENV_BIND_ADDRESS: &str = "ONEGEO_BIND_ADDRESS";
pub const ENV_DATA_DIR: &str = "ONEGEO_DATA_DIR";
pub const ENV_ARCHIVE_URL: &str = "ONEGEO_ARCHIVE_URL";
pub const ENV_ARCHIVE_TOKEN: &str = "ONEGEO_ARCHIVE_TOKEN";

// ============================================================================
// Server
// ============================================================================

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Largest accepted upload body (bytes). 100 MiB.
///
/// Every measurement of a file is held in memory before commit, so this
/// also bounds ingestion memory.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

// ============================================================================
// Storage
// ============================================================================

pub const DEFAULT_DATA_DIR: &str = "./data";

/// sled database directory under the data dir.
pub const DB_DIR_NAME: &str = "wells.db";

// ============================================================================
// Archive
// ============================================================================

/// Raw-file directory used by the local archive backend.
pub const DEFAULT_ARCHIVE_DIR: &str = "./data/raw";

/// HTTP archive request timeout (seconds).
pub const DEFAULT_ARCHIVE_TIMEOUT_SECS: u64 = 30;
