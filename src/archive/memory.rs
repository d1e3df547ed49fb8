//! In-process archive

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{object_name, BlobError, BlobStore};

/// Keeps archived files in a map. Can be switched to always fail, which is
/// how archival failures are exercised.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    unavailable: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// An archive whose every `put` fails.
    pub fn unavailable() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            unavailable: true,
        }
    }

    /// Archived bytes for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map_or(0, |objects| objects.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, filename: &str, content: &[u8]) -> Result<String, BlobError> {
        if self.unavailable {
            return Err(BlobError::Unavailable("memory archive disabled".to_string()));
        }

        let name = object_name(filename)?;
        self.objects
            .lock()
            .map_err(|e| BlobError::Unavailable(e.to_string()))?
            .insert(name.to_string(), content.to_vec());
        Ok(format!("memory://{name}"))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
