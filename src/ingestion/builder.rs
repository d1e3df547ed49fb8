//! Measurement builder
//!
//! Aligns the shared depth index with one curve's value column. Pure and
//! stateless; a length mismatch is an error, never a truncation.

use rayon::prelude::*;
use thiserror::Error;

use crate::error::{Classify, ErrorClass};
use crate::types::{EntityId, Measurement};

/// Alignment errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("curve {mnemonic}: {values_len} values for {index_len} index samples")]
    LengthMismatch {
        mnemonic: String,
        index_len: usize,
        values_len: usize,
    },
}

impl Classify for BuildError {
    fn class(&self) -> ErrorClass {
        ErrorClass::InvalidInput
    }
}

/// One record per index position: `(curve_id, index[i], values[i])`.
pub fn build_measurements(
    curve_id: EntityId,
    mnemonic: &str,
    index: &[f64],
    values: &[Option<f64>],
) -> Result<Vec<Measurement>, BuildError> {
    if index.len() != values.len() {
        return Err(BuildError::LengthMismatch {
            mnemonic: mnemonic.to_string(),
            index_len: index.len(),
            values_len: values.len(),
        });
    }

    Ok(index
        .iter()
        .zip(values)
        .map(|(&depth, &value)| Measurement {
            curve_id,
            depth,
            value,
        })
        .collect())
}

/// A curve ready to be aligned: its id, mnemonic and value column.
pub struct CurveColumn<'a> {
    pub curve_id: EntityId,
    pub mnemonic: &'a str,
    pub values: &'a [Option<f64>],
}

/// Build every column against the same index in parallel.
///
/// Output keeps column order, so all records of the first column come
/// first. Fails on the first misaligned column.
pub fn build_all(index: &[f64], columns: &[CurveColumn<'_>]) -> Result<Vec<Measurement>, BuildError> {
    let per_curve: Vec<Vec<Measurement>> = columns
        .par_iter()
        .map(|col| build_measurements(col.curve_id, col.mnemonic, index, col.values))
        .collect::<Result<_, _>>()?;

    let total = per_curve.iter().map(Vec::len).sum();
    let mut measurements = Vec::with_capacity(total);
    for records in per_curve {
        measurements.extend(records);
    }
    Ok(measurements)
}
