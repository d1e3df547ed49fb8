//! Persisted entities: Well, Curve, Measurement
//!
//! A Well owns its Curves and each Curve owns its Measurements. Nothing is
//! shared across wells, so deleting a Well removes the whole subtree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-generated identity shared by wells and curves.
pub type EntityId = u64;

/// One ingested log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    pub id: EntityId,
    /// Display name: `WELL` header value, or the filename when absent
    pub name: String,
    /// Source filename; unique across all wells (dedup key)
    pub original_filename: String,
    pub created_at: DateTime<Utc>,
    /// Retrieval URL returned by the blob archive
    #[serde(default)]
    pub archive_url: Option<String>,
    /// Hex MD5 of the raw upload, kept for audit
    #[serde(default)]
    pub content_md5: Option<String>,
}

/// Metadata of one measured quantity of a well.
///
/// The index (depth) curve of a log file is never stored as a `Curve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub id: EntityId,
    pub well_id: EntityId,
    pub mnemonic: String,
    pub unit: Option<String>,
    pub description: Option<String>,
}

/// A depth-aligned sample of a curve.
///
/// `value` is `None` for a logged null sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub curve_id: EntityId,
    pub depth: f64,
    pub value: Option<f64>,
}

/// Everything one ingestion commits atomically.
#[derive(Debug, Clone)]
pub struct IngestBatch {
    pub well: Well,
    pub curves: Vec<Curve>,
    pub measurements: Vec<Measurement>,
}

impl IngestBatch {
    pub fn measurement_count(&self) -> usize {
        self.measurements.len()
    }
}
