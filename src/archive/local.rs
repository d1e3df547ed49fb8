//! Local-directory archive

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{object_name, BlobError, BlobStore};

/// Writes each upload to `<dir>/<basename>`, overwriting earlier copies.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    dir: PathBuf,
}

impl LocalBlobStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, filename: &str, content: &[u8]) -> Result<String, BlobError> {
        let name = object_name(filename)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| BlobError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| BlobError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = content.len(), "Archived raw file");
        Ok(format!("file://{}", path.display()))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
