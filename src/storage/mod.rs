//! Well / Curve / Measurement persistence
//!
//! The pipelines only see the [`WellStore`] trait, injected as
//! `Arc<dyn WellStore>`:
//! - `SledStore`: durable embedded database, one tree per entity
//! - `InMemoryStore`: for tests and `--ephemeral` runs
//!
//! Both backends enforce one Well per source filename inside the same atomic
//! step that writes the Well, so concurrent uploads of one file cannot both
//! persist.

mod lockfile;
mod memory;
mod sled_store;

pub use lockfile::DataDirLock;
pub use memory::InMemoryStore;
pub use sled_store::SledStore;

use crate::error::{Classify, ErrorClass};
use crate::types::{Curve, EntityId, IngestBatch, Measurement, Well};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Another ingestion already claimed this filename.
    #[error("'{filename}' is already ingested as well {well_id}")]
    DuplicateFilename {
        filename: String,
        well_id: EntityId,
        well_name: String,
    },
}

impl Classify for StoreError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::DuplicateFilename { .. } => ErrorClass::InvalidInput,
            _ => ErrorClass::Infrastructure,
        }
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Storage capability shared by ingestion, interpretation and the catalog.
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers.
pub trait WellStore: Send + Sync {
    /// Reserve a fresh identity for a Well or Curve.
    fn allocate_id(&self) -> Result<EntityId, StoreError>;

    /// Exact match on the original filename.
    fn find_well_by_filename(&self, filename: &str) -> Result<Option<Well>, StoreError>;

    /// Write a Well with all its Curves and Measurements, or nothing.
    ///
    /// Fails with [`StoreError::DuplicateFilename`] when the filename is
    /// already taken, in which case nothing is written.
    fn commit_ingestion(&self, batch: &IngestBatch) -> Result<(), StoreError>;

    /// All wells, ascending by id.
    fn list_wells(&self) -> Result<Vec<Well>, StoreError>;

    fn get_well(&self, well_id: EntityId) -> Result<Option<Well>, StoreError>;

    /// Curves of a well in declaration order.
    fn list_curves(&self, well_id: EntityId) -> Result<Vec<Curve>, StoreError>;

    fn get_curve(&self, curve_id: EntityId) -> Result<Option<Curve>, StoreError>;

    /// Measurements with `min_depth <= depth <= max_depth`, ascending by depth.
    fn measurements_in_range(
        &self,
        curve_id: EntityId,
        min_depth: f64,
        max_depth: f64,
    ) -> Result<Vec<Measurement>, StoreError>;

    /// Number of measurements stored for a curve.
    fn count_measurements(&self, curve_id: EntityId) -> Result<usize, StoreError>;

    /// Remove a well together with its curves and measurements.
    ///
    /// Returns `false` when the well does not exist.
    fn delete_well(&self, well_id: EntityId) -> Result<bool, StoreError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Collapse `-0.0` onto `0.0` so both backends order and compare depths
/// identically.
pub(crate) fn normalize_depth(depth: f64) -> f64 {
    if depth == 0.0 {
        0.0
    } else {
        depth
    }
}
