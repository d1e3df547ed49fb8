//! Raw file archival
//!
//! Every upload is handed to a [`BlobStore`] before parsing so the original
//! artifact survives even when ingestion later fails.
//!
//! - `LocalBlobStore`: files under a local directory
//! - `HttpBlobStore`: `PUT` to an S3-style object endpoint
//! - `MemoryBlobStore`: in-process map for tests and ephemeral runs

mod http;
mod local;
mod memory;

pub use http::HttpBlobStore;
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{Classify, ErrorClass};

/// Archive errors
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("invalid object name: {0:?}")]
    InvalidName(String),

    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid archive URL: {0}")]
    InvalidUrl(String),

    #[error("archive returned status {status} for {url}")]
    Rejected {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("archive unavailable: {0}")]
    Unavailable(String),
}

impl Classify for BlobError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidName(_) => ErrorClass::InvalidInput,
            _ => ErrorClass::Infrastructure,
        }
    }
}

/// Blob archive keyed by filename.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `content` under `filename` and return its retrieval URL.
    async fn put(&self, filename: &str, content: &[u8]) -> Result<String, BlobError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Reduce a client-supplied filename to a single safe path component.
pub fn object_name(filename: &str) -> Result<&str, BlobError> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        return Err(BlobError::InvalidName(filename.to_string()));
    }
    Ok(name)
}
