//! Shared data structures
//!
//! - entities: Well, Curve, Measurement and the ingestion batch
//! - report: ingestion outcomes and interpretation reports

mod entities;
mod report;

pub use entities::*;
pub use report::*;
