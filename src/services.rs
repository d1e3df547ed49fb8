//! Backend wiring
//!
//! Builds the store and archive named by [`AppConfig`] once at startup and
//! hands out the pipelines that share them.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::archive::{BlobStore, HttpBlobStore, LocalBlobStore, MemoryBlobStore};
use crate::catalog::Catalog;
use crate::config::{AppConfig, ArchiveBackend};
use crate::ingestion::IngestionPipeline;
use crate::interpretation::InterpretationEngine;
use crate::storage::{DataDirLock, InMemoryStore, SledStore, StoreError, WellStore};

/// Shared backends for the server and CLI commands.
pub struct Services {
    pub store: Arc<dyn WellStore>,
    pub archive: Arc<dyn BlobStore>,
    sled: Option<Arc<SledStore>>,
    _lock: Option<DataDirLock>,
}

impl Services {
    /// Open the configured backends.
    ///
    /// `storage.ephemeral` keeps both the store and the archive in memory.
    pub fn open(config: &AppConfig) -> Result<Self> {
        if config.storage.ephemeral {
            info!("Ephemeral mode: wells and raw files are kept in memory only");
            return Ok(Self::ephemeral());
        }

        let lock = DataDirLock::acquire(&config.storage.data_dir)?;
        let db_path = config.storage.db_path();
        let sled = Arc::new(
            SledStore::open(&db_path)
                .with_context(|| format!("Failed to open well database at {}", db_path.display()))?,
        );
        info!(path = %db_path.display(), "Well database opened");

        let archive = open_archive(config)?;
        info!(backend = archive.backend_name(), "Raw file archive ready");

        Ok(Self {
            store: sled.clone(),
            archive,
            sled: Some(sled),
            _lock: Some(lock),
        })
    }

    /// In-memory store and archive.
    pub fn ephemeral() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            archive: Arc::new(MemoryBlobStore::new()),
            sled: None,
            _lock: None,
        }
    }

    pub fn pipeline(&self) -> IngestionPipeline {
        IngestionPipeline::new(Arc::clone(&self.store), Arc::clone(&self.archive))
    }

    pub fn engine(&self) -> InterpretationEngine {
        InterpretationEngine::new(Arc::clone(&self.store))
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(Arc::clone(&self.store))
    }

    /// Flush durable storage; a no-op in memory.
    pub fn flush(&self) -> Result<(), StoreError> {
        match &self.sled {
            Some(sled) => sled.flush(),
            None => Ok(()),
        }
    }
}

fn open_archive(config: &AppConfig) -> Result<Arc<dyn BlobStore>> {
    let archive = &config.archive;
    Ok(match archive.backend {
        ArchiveBackend::Local => Arc::new(LocalBlobStore::new(&archive.local_dir)),
        ArchiveBackend::Http => {
            let base_url = archive
                .base_url
                .as_deref()
                .context("archive.base_url is required for the http backend")?;
            let mut store = HttpBlobStore::new(base_url, archive.timeout())
                .context("Failed to build HTTP archive client")?;
            if let Some(token) = &archive.auth_token {
                store = store.with_auth_token(token.clone());
            }
            Arc::new(store)
        }
        ArchiveBackend::Memory => Arc::new(MemoryBlobStore::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_durable_backends() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.data_dir = dir.path().join("data");
        config.archive.local_dir = dir.path().join("raw");

        let services = Services::open(&config).unwrap();
        assert_eq!(services.store.backend_name(), "sled");
        assert_eq!(services.archive.backend_name(), "local");
        assert!(services.flush().is_ok());
    }

    #[test]
    fn test_second_open_of_same_data_dir_fails() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config.archive.backend = ArchiveBackend::Memory;

        let _first = Services::open(&config).unwrap();
        assert!(Services::open(&config).is_err());
    }

    #[test]
    fn test_ephemeral_config() {
        let mut config = AppConfig::default();
        config.storage.ephemeral = true;
        let services = Services::open(&config).unwrap();
        assert_eq!(services.store.backend_name(), "in-memory");
        assert_eq!(services.archive.backend_name(), "memory");
    }
}
