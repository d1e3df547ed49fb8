//! Pipeline outputs returned at the service boundary

use serde::{Deserialize, Serialize};

use super::EntityId;

/// Result of an ingestion request.
///
/// Serializes flat so clients can branch on the `duplicate` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngestOutcome {
    Duplicate(DuplicateNotice),
    Ingested(IngestSummary),
}

impl IngestOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    pub fn well_id(&self) -> EntityId {
        match self {
            Self::Duplicate(notice) => notice.well_id,
            Self::Ingested(summary) => summary.well_id,
        }
    }
}

/// Returned when a file with the same name was already ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateNotice {
    pub duplicate: bool,
    pub well_id: EntityId,
    pub well_name: String,
    pub message: String,
}

impl DuplicateNotice {
    pub fn new(well_id: EntityId, well_name: impl Into<String>) -> Self {
        Self {
            duplicate: true,
            well_id,
            well_name: well_name.into(),
            message: "File already uploaded.".to_string(),
        }
    }
}

/// Counts from a successful ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub duplicate: bool,
    pub well_id: EntityId,
    pub well_name: String,
    pub curves_ingested: usize,
    pub measurements_inserted: usize,
}

/// Rounded summary statistics of an interpreted window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveStatistics {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub std_dev: f64,
    pub count: usize,
}

/// Interpretation of one curve over one depth window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationReport {
    /// Upper-cased mnemonic
    pub curve: String,
    pub statistics: CurveStatistics,
    /// Sentences in firing order: statistics first, then domain rules
    pub interpretation: Vec<String>,
}
