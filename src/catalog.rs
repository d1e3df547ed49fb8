//! Read-side queries over the well store, plus cascade delete

use std::sync::Arc;
use tracing::info;

use crate::error::{check_depth_range, Classify, ErrorClass};
use crate::storage::{StoreError, WellStore};
use crate::types::{Curve, EntityId, Measurement, Well};

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    InvalidRange(String),

    #[error("Well not found.")]
    WellNotFound(EntityId),

    #[error("No curves found for this well.")]
    NoCurves(EntityId),

    #[error("No data found for given range.")]
    NoData,

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl Classify for CatalogError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidRange(_) => ErrorClass::InvalidInput,
            Self::WellNotFound(_) | Self::NoCurves(_) | Self::NoData => ErrorClass::NotFound,
            Self::Storage(e) => e.class(),
        }
    }
}

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn WellStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn WellStore>) -> Self {
        Self { store }
    }

    pub fn list_wells(&self) -> Result<Vec<Well>, CatalogError> {
        Ok(self.store.list_wells()?)
    }

    pub fn well_count(&self) -> Result<usize, CatalogError> {
        Ok(self.store.list_wells()?.len())
    }

    /// Curves of a well in declaration order. An unknown well and a well
    /// without curves both report [`CatalogError::NoCurves`].
    pub fn list_curves(&self, well_id: EntityId) -> Result<Vec<Curve>, CatalogError> {
        let curves = self.store.list_curves(well_id)?;
        if curves.is_empty() {
            return Err(CatalogError::NoCurves(well_id));
        }
        Ok(curves)
    }

    /// Measurements of a curve within `[min_depth, max_depth]`, ascending by
    /// depth. An empty window is an error, not an empty list.
    pub fn curve_data(
        &self,
        curve_id: EntityId,
        min_depth: f64,
        max_depth: f64,
    ) -> Result<Vec<Measurement>, CatalogError> {
        check_depth_range(min_depth, max_depth).map_err(CatalogError::InvalidRange)?;

        let rows = self
            .store
            .measurements_in_range(curve_id, min_depth, max_depth)?;
        if rows.is_empty() {
            return Err(CatalogError::NoData);
        }
        Ok(rows)
    }

    /// Remove a well with its curves and measurements.
    pub fn delete_well(&self, well_id: EntityId) -> Result<(), CatalogError> {
        if !self.store.delete_well(well_id)? {
            return Err(CatalogError::WellNotFound(well_id));
        }
        info!(well_id, "Well deleted");
        Ok(())
    }
}
