use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Every section and field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl AppConfig {
    /// Load using the standard search order, then apply environment
    /// overrides and validate.
    ///
    /// An explicit path must load; the env var and working-directory files
    /// fall back to defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                let config = Self::load_from_file(path)?;
                info!(path = %path.display(), "Loaded config from --config");
                config
            }
            None => Self::discover(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn discover() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from ONEGEO_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from ONEGEO_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "ONEGEO_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./onegeo.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./onegeo.toml, using defaults");
                }
            }
        }

        info!("No onegeo.toml found, using built-in defaults");
        Self::default()
    }

    /// Parse a TOML file. Does not apply overrides or validate.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `ONEGEO_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(defaults::ENV_BIND_ADDRESS) {
            self.server.bind_address = addr;
        }
        if let Some(dir) = lookup(defaults::ENV_DATA_DIR) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(defaults::ENV_ARCHIVE_URL) {
            self.archive.backend = ArchiveBackend::Http;
            self.archive.base_url = Some(url);
        }
        if let Some(token) = lookup(defaults::ENV_ARCHIVE_TOKEN) {
            self.archive.auth_token = Some(token);
        }
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.bind_address: '{}' is not a socket address",
                self.server.bind_address
            ));
        }
        if self.server.max_upload_bytes == 0 {
            errors.push("server.max_upload_bytes: must be > 0".to_string());
        }
        for origin in &self.server.cors_origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                errors.push(format!("server.cors_origins: '{origin}' must be an http(s) origin"));
            }
        }

        if !self.storage.ephemeral && self.storage.data_dir.as_os_str().is_empty() {
            errors.push("storage.data_dir: must not be empty".to_string());
        }

        match self.archive.backend {
            ArchiveBackend::Local => {
                if self.archive.local_dir.as_os_str().is_empty() {
                    errors.push("archive.local_dir: must not be empty".to_string());
                }
            }
            ArchiveBackend::Http => match self.archive.base_url.as_deref() {
                None | Some("") => {
                    errors.push("archive.base_url: required when backend = \"http\"".to_string());
                }
                Some(url) => match reqwest::Url::parse(url) {
                    Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                    Ok(parsed) => errors.push(format!(
                        "archive.base_url: unsupported scheme '{}'",
                        parsed.scheme()
                    )),
                    Err(e) => errors.push(format!("archive.base_url: {e}")),
                },
            },
            ArchiveBackend::Memory => {}
        }
        if self.archive.timeout_secs == 0 {
            errors.push("archive.timeout_secs: must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({path:?}): {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error ({path:?}): {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Request body cap for uploads (bytes)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Cross-origin callers allowed by CORS. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_bind_address() -> String {
    defaults::DEFAULT_BIND_ADDRESS.to_string()
}
fn default_max_upload_bytes() -> usize {
    defaults::DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_origins: Vec::new(),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Keep everything in memory; nothing survives the process.
    #[serde(default)]
    pub ephemeral: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_DATA_DIR)
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(defaults::DB_DIR_NAME)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ephemeral: false,
        }
    }
}

// ============================================================================
// Archive
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveBackend {
    #[default]
    Local,
    Http,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub backend: ArchiveBackend,

    #[serde(default = "default_archive_dir")]
    pub local_dir: PathBuf,

    /// Object endpoint for the http backend; files go to `{base_url}/{name}`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the http backend
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,

    #[serde(default = "default_archive_timeout")]
    pub timeout_secs: u64,
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_ARCHIVE_DIR)
}
fn default_archive_timeout() -> u64 {
    defaults::DEFAULT_ARCHIVE_TIMEOUT_SECS
}

impl ArchiveConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            backend: ArchiveBackend::default(),
            local_dir: default_archive_dir(),
            base_url: None,
            auth_token: None,
            timeout_secs: default_archive_timeout(),
        }
    }
}
