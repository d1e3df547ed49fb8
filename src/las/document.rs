//! Parsed LAS document model

use serde::Serialize;

/// Null sentinel used when the `~W` section has no `NULL` item.
pub const DEFAULT_NULL_VALUE: f64 = -999.25;

/// A `MNEM.UNIT VALUE : DESCRIPTION` line from a header section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderItem {
    pub mnemonic: String,
    pub unit: Option<String>,
    pub value: String,
    pub description: Option<String>,
}

/// One entry of the `~C` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurveDefinition {
    pub mnemonic: String,
    pub unit: Option<String>,
    pub description: Option<String>,
}

impl From<HeaderItem> for CurveDefinition {
    fn from(item: HeaderItem) -> Self {
        Self {
            mnemonic: item.mnemonic,
            unit: item.unit,
            description: item.description,
        }
    }
}

/// Structured view of a LAS file.
///
/// `curves[0]` is the index curve and its samples live in `index`.
/// `values[i]` holds the samples of `curves[i + 1]` and always has the same
/// length as `index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LasDocument {
    pub version: Option<String>,
    pub wrapped: bool,
    pub null_value: f64,
    pub well_items: Vec<HeaderItem>,
    pub parameters: Vec<HeaderItem>,
    pub curves: Vec<CurveDefinition>,
    pub index: Vec<f64>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl LasDocument {
    /// Look up a `~W` item by mnemonic (case-insensitive).
    pub fn well_item(&self, mnemonic: &str) -> Option<&HeaderItem> {
        self.well_items
            .iter()
            .find(|item| item.mnemonic.eq_ignore_ascii_case(mnemonic))
    }

    /// Well name from the `WELL` header item, `None` when absent or blank.
    pub fn well_name(&self) -> Option<&str> {
        self.well_item("WELL")
            .map(|item| item.value.trim())
            .filter(|name| !name.is_empty())
    }

    /// The first declared curve, which indexes every other curve.
    pub fn index_curve(&self) -> Option<&CurveDefinition> {
        self.curves.first()
    }

    /// Non-index curves paired with their samples, in declaration order.
    pub fn value_curves(&self) -> impl Iterator<Item = (&CurveDefinition, &[Option<f64>])> {
        self.curves
            .iter()
            .skip(1)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Number of depth samples.
    pub fn sample_count(&self) -> usize {
        self.index.len()
    }
}
