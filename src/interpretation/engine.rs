use std::sync::Arc;
use tracing::debug;

use super::rules::domain_observations;
use super::statistics::{observations, Summary};
use crate::error::{check_depth_range, Classify, ErrorClass};
use crate::storage::{StoreError, WellStore};
use crate::types::{EntityId, InterpretationReport};

/// Interpretation errors
#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error("{0}")]
    InvalidRange(String),

    #[error("Curve not found.")]
    CurveNotFound(EntityId),

    #[error("No data found in selected depth range.")]
    NoData,

    #[error("No valid measurement values.")]
    NoValidValues,

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl Classify for InterpretError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidRange(_) => ErrorClass::InvalidInput,
            Self::CurveNotFound(_) | Self::NoData | Self::NoValidValues => ErrorClass::NotFound,
            Self::Storage(e) => e.class(),
        }
    }
}

/// Read-only interpretation over a [`WellStore`].
#[derive(Clone)]
pub struct InterpretationEngine {
    store: Arc<dyn WellStore>,
}

impl InterpretationEngine {
    pub fn new(store: Arc<dyn WellStore>) -> Self {
        Self { store }
    }

    /// Interpret `curve_id` over `[min_depth, max_depth]`.
    ///
    /// The range is validated before the store is touched.
    pub fn interpret(
        &self,
        curve_id: EntityId,
        min_depth: f64,
        max_depth: f64,
    ) -> Result<InterpretationReport, InterpretError> {
        check_depth_range(min_depth, max_depth).map_err(InterpretError::InvalidRange)?;

        let curve = self
            .store
            .get_curve(curve_id)?
            .ok_or(InterpretError::CurveNotFound(curve_id))?;

        let rows = self
            .store
            .measurements_in_range(curve_id, min_depth, max_depth)?;
        if rows.is_empty() {
            return Err(InterpretError::NoData);
        }

        let values: Vec<f64> = rows
            .iter()
            .filter_map(|m| m.value)
            .filter(|v| v.is_finite())
            .collect();
        debug!(
            curve_id,
            mnemonic = %curve.mnemonic,
            rows = rows.len(),
            valid = values.len(),
            "Interpreting curve window"
        );

        interpret_values(&curve.mnemonic, &values).ok_or(InterpretError::NoValidValues)
    }
}

/// Layers 2 and 3 over an already extracted, depth-ordered value sequence.
///
/// `None` when `values` is empty.
pub fn interpret_values(mnemonic: &str, values: &[f64]) -> Option<InterpretationReport> {
    let summary = Summary::of(values)?;
    let mnemonic = mnemonic.to_uppercase();

    let interpretation = observations(&summary)
        .into_iter()
        .chain(domain_observations(&mnemonic, summary.mean))
        .map(str::to_string)
        .collect();

    Some(InterpretationReport {
        curve: mnemonic,
        statistics: summary.to_report(),
        interpretation,
    })
}
