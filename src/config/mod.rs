//! Service configuration
//!
//! ## Loading Order
//!
//! 1. `--config <PATH>` on the command line
//! 2. `ONEGEO_CONFIG` environment variable (path to TOML file)
//! 3. `onegeo.toml` in the current working directory
//! 4. Built-in defaults
//!
//! `ONEGEO_BIND_ADDRESS`, `ONEGEO_DATA_DIR`, `ONEGEO_ARCHIVE_URL` and
//! `ONEGEO_ARCHIVE_TOKEN` override the loaded values.

mod app_config;
pub mod defaults;

pub use app_config::*;
