//! LAS ingestion pipeline
//!
//! ```text
//! filename + bytes
//!   ├─ duplicate check (filename) ──► DuplicateNotice
//!   ├─ empty check
//!   ├─ archive raw bytes (BlobStore)
//!   ├─ parse_las ─► LasDocument
//!   ├─ allocate Well / Curve ids, build Measurements
//!   └─ commit_ingestion (atomic) ──► IngestSummary
//! ```
//!
//! The archive write happens before parsing and is not undone when a later
//! step fails. Everything after it is committed in one transaction.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::builder::{build_all, BuildError, CurveColumn};
use crate::archive::{BlobError, BlobStore};
use crate::error::{Classify, ErrorClass};
use crate::las::{is_index_mnemonic, parse_las, LasError};
use crate::storage::{StoreError, WellStore};
use crate::types::{
    Curve, DuplicateNotice, IngestBatch, IngestOutcome, IngestSummary, Well,
};

/// Ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Uploaded file is empty.")]
    EmptyInput,

    #[error("failed to archive raw file: {0}")]
    Archive(#[from] BlobError),

    #[error("invalid LAS file: {0}")]
    Parse(#[from] LasError),

    #[error("misaligned log data: {0}")]
    Build(#[from] BuildError),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("ingestion task failed: {0}")]
    Task(String),
}

impl Classify for IngestError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyInput | Self::Parse(_) | Self::Build(_) => ErrorClass::InvalidInput,
            Self::Archive(e) => e.class(),
            Self::Storage(e) => e.class(),
            Self::Task(_) => ErrorClass::Infrastructure,
        }
    }
}

/// Ingests LAS uploads into a [`WellStore`], archiving raw bytes first.
#[derive(Clone)]
pub struct IngestionPipeline {
    store: Arc<dyn WellStore>,
    archive: Arc<dyn BlobStore>,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn WellStore>, archive: Arc<dyn BlobStore>) -> Self {
        Self { store, archive }
    }

    /// Ingest one uploaded file.
    ///
    /// Filename equality is the identity check: a second upload with the same
    /// name returns the existing well whatever its content.
    pub async fn ingest(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<IngestOutcome, IngestError> {
        let store = Arc::clone(&self.store);
        let lookup = filename.to_string();
        let existing = tokio::task::spawn_blocking(move || store.find_well_by_filename(&lookup))
            .await
            .map_err(|e| IngestError::Task(e.to_string()))??;
        if let Some(existing) = existing {
            info!(
                filename,
                well_id = existing.id,
                "Duplicate upload, returning existing well"
            );
            return Ok(IngestOutcome::Duplicate(DuplicateNotice::new(
                existing.id,
                existing.name,
            )));
        }

        if content.is_empty() {
            return Err(IngestError::EmptyInput);
        }

        let archive_url = self.archive.put(filename, &content).await?;
        info!(
            filename,
            bytes = content.len(),
            archive = self.archive.backend_name(),
            "Raw file archived"
        );

        let store = Arc::clone(&self.store);
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || {
            persist(store.as_ref(), &filename, &content, Some(archive_url))
        })
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
    }
}

/// Parse, build and commit. Runs on the blocking pool.
fn persist(
    store: &dyn WellStore,
    filename: &str,
    content: &[u8],
    archive_url: Option<String>,
) -> Result<IngestOutcome, IngestError> {
    let batch = prepare_batch(store, filename, content, archive_url)?;
    let summary = IngestSummary {
        duplicate: false,
        well_id: batch.well.id,
        well_name: batch.well.name.clone(),
        curves_ingested: batch.curves.len(),
        measurements_inserted: batch.measurement_count(),
    };

    match store.commit_ingestion(&batch) {
        Ok(()) => {
            info!(
                filename,
                well_id = summary.well_id,
                well = %summary.well_name,
                curves = summary.curves_ingested,
                measurements = summary.measurements_inserted,
                "LAS file ingested"
            );
            Ok(IngestOutcome::Ingested(summary))
        }
        // Lost a race with a concurrent upload of the same file
        Err(StoreError::DuplicateFilename {
            well_id, well_name, ..
        }) => {
            info!(filename, well_id, "Concurrent duplicate upload resolved to existing well");
            Ok(IngestOutcome::Duplicate(DuplicateNotice::new(well_id, well_name)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Turn raw bytes into a Well with its Curves and Measurements.
///
/// The first declared curve is the index and is not stored.
fn prepare_batch(
    store: &dyn WellStore,
    filename: &str,
    content: &[u8],
    archive_url: Option<String>,
) -> Result<IngestBatch, IngestError> {
    let document = parse_las(content)?;

    if let Some(index) = document.index_curve() {
        if !is_index_mnemonic(&index.mnemonic) {
            warn!(
                filename,
                mnemonic = %index.mnemonic,
                "First curve is not a recognised depth/time index; treating it as the index anyway"
            );
        }
    }

    let well = Well {
        id: store.allocate_id()?,
        name: document
            .well_name()
            .map_or_else(|| filename.to_string(), str::to_string),
        original_filename: filename.to_string(),
        created_at: Utc::now(),
        archive_url,
        content_md5: Some(format!("{:x}", md5::compute(content))),
    };

    let mut curves = Vec::with_capacity(document.curves.len().saturating_sub(1));
    for (definition, _) in document.value_curves() {
        curves.push(Curve {
            id: store.allocate_id()?,
            well_id: well.id,
            mnemonic: definition.mnemonic.clone(),
            unit: definition.unit.clone(),
            description: definition.description.clone(),
        });
    }

    let columns: Vec<CurveColumn<'_>> = curves
        .iter()
        .zip(document.value_curves())
        .map(|(curve, (_, values))| CurveColumn {
            curve_id: curve.id,
            mnemonic: &curve.mnemonic,
            values,
        })
        .collect();
    let measurements = build_all(&document.index, &columns)?;

    Ok(IngestBatch {
        well,
        curves,
        measurements,
    })
}
