//! LAS ingestion: measurement alignment and the upload pipeline

pub mod builder;
mod pipeline;

pub use builder::{build_all, build_measurements, BuildError, CurveColumn};
pub use pipeline::{IngestError, IngestionPipeline};
