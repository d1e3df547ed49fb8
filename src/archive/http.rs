//! HTTP object-store archive
//!
//! Issues `PUT {base_url}/{name}` with the raw bytes, which works against S3
//! pre-authorised buckets, MinIO and most object gateways.

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

use super::{object_name, BlobError, BlobStore};

/// Archive that uploads over HTTP.
#[derive(Clone)]
pub struct HttpBlobStore {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpBlobStore {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BlobError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BlobError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BlobError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            auth_token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every upload.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// URL an object named `name` is stored at.
    pub fn object_url(&self, name: &str) -> Result<Url, BlobError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BlobError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, filename: &str, content: &[u8]) -> Result<String, BlobError> {
        let url = self.object_url(object_name(filename)?)?;

        let mut request = self
            .http
            .put(url.clone())
            .header("Content-Type", "application/octet-stream")
            .body(content.to_vec());
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(BlobError::Rejected {
                status: resp.status(),
                url: url.to_string(),
            });
        }

        debug!(url = %url, bytes = content.len(), "Archived raw file");
        Ok(url.to_string())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
