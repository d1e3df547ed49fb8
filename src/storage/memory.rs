//! In-memory well store for tests and ephemeral deployments
//!
//! Thread-safe via `RwLock`. Not durable; data is lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::{normalize_depth, StoreError, WellStore};
use crate::types::{Curve, EntityId, IngestBatch, Measurement, Well};

#[derive(Default)]
struct Tables {
    wells: BTreeMap<EntityId, Well>,
    filenames: HashMap<String, EntityId>,
    curves: BTreeMap<EntityId, Curve>,
    /// Per curve, in source row order
    measurements: HashMap<EntityId, Vec<Measurement>>,
}

/// Map-backed [`WellStore`].
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_id: AtomicU64::new(1),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WellStore for InMemoryStore {
    fn allocate_id(&self) -> Result<EntityId, StoreError> {
        Ok(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn find_well_by_filename(&self, filename: &str) -> Result<Option<Well>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .filenames
            .get(filename)
            .and_then(|id| tables.wells.get(id))
            .cloned())
    }

    fn commit_ingestion(&self, batch: &IngestBatch) -> Result<(), StoreError> {
        let mut tables = self.write()?;

        let filename = &batch.well.original_filename;
        if let Some(&well_id) = tables.filenames.get(filename) {
            let well_name = tables
                .wells
                .get(&well_id)
                .map_or_else(|| filename.clone(), |w| w.name.clone());
            return Err(StoreError::DuplicateFilename {
                filename: filename.clone(),
                well_id,
                well_name,
            });
        }

        tables.filenames.insert(filename.clone(), batch.well.id);
        tables.wells.insert(batch.well.id, batch.well.clone());
        for curve in &batch.curves {
            tables.curves.insert(curve.id, curve.clone());
            tables.measurements.entry(curve.id).or_default();
        }
        for m in &batch.measurements {
            tables.measurements.entry(m.curve_id).or_default().push(*m);
        }

        Ok(())
    }

    fn list_wells(&self) -> Result<Vec<Well>, StoreError> {
        Ok(self.read()?.wells.values().cloned().collect())
    }

    fn get_well(&self, well_id: EntityId) -> Result<Option<Well>, StoreError> {
        Ok(self.read()?.wells.get(&well_id).cloned())
    }

    fn list_curves(&self, well_id: EntityId) -> Result<Vec<Curve>, StoreError> {
        Ok(self
            .read()?
            .curves
            .values()
            .filter(|c| c.well_id == well_id)
            .cloned()
            .collect())
    }

    fn get_curve(&self, curve_id: EntityId) -> Result<Option<Curve>, StoreError> {
        Ok(self.read()?.curves.get(&curve_id).cloned())
    }

    fn measurements_in_range(
        &self,
        curve_id: EntityId,
        min_depth: f64,
        max_depth: f64,
    ) -> Result<Vec<Measurement>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<Measurement> = tables
            .measurements
            .get(&curve_id)
            .map(|all| {
                all.iter()
                    .filter(|m| m.depth >= min_depth && m.depth <= max_depth)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();

        // Stable: equal depths keep source row order
        rows.sort_by(|a, b| normalize_depth(a.depth).total_cmp(&normalize_depth(b.depth)));
        Ok(rows)
    }

    fn count_measurements(&self, curve_id: EntityId) -> Result<usize, StoreError> {
        Ok(self
            .read()?
            .measurements
            .get(&curve_id)
            .map_or(0, Vec::len))
    }

    fn delete_well(&self, well_id: EntityId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        let Some(well) = tables.wells.remove(&well_id) else {
            return Ok(false);
        };

        tables.filenames.remove(&well.original_filename);
        let curve_ids: Vec<EntityId> = tables
            .curves
            .values()
            .filter(|c| c.well_id == well_id)
            .map(|c| c.id)
            .collect();
        for curve_id in curve_ids {
            tables.curves.remove(&curve_id);
            tables.measurements.remove(&curve_id);
        }

        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}
