//! OneGeo: well-log ingestion and interpretation
//!
//! ## Architecture
//!
//! - **LAS Parser**: LAS 2.0 text to a structured document
//! - **Ingestion Pipeline**: archive, parse, align and commit one upload atomically
//! - **Interpretation Engine**: statistics and petrophysical heuristics over a depth window
//! - **Catalog**: read-side queries and cascade delete
//! - **Storage / Archive**: pluggable `WellStore` and `BlobStore` backends

pub mod api;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod interpretation;
pub mod las;
pub mod services;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::AppConfig;

// Re-export commonly used types
pub use types::{
    Curve, CurveStatistics, DuplicateNotice, EntityId, IngestOutcome, IngestSummary,
    InterpretationReport, Measurement, Well,
};

// Re-export pipelines
pub use catalog::Catalog;
pub use ingestion::IngestionPipeline;
pub use interpretation::InterpretationEngine;

// Re-export storage
pub use storage::{InMemoryStore, SledStore, StoreError, WellStore};
