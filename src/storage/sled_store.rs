//! Sled-backed well store
//!
//! Tree layout:
//! - `wells`: `{well_id}` → Well JSON
//! - `well_filenames`: `{original_filename}` → `{well_id}`
//! - `curves`: `{curve_id}` → Curve JSON
//! - `well_curves`: `{well_id}{curve_id}` → empty
//! - `measurements`: `{curve_id}{depth}{row}` → Measurement JSON
//!
//! Ids are big-endian `u64`. Depth is stored as order-preserving bits so a
//! prefix range scan over one curve yields ascending depth, with the source
//! row position breaking ties between equal depths.

use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use sled::{Batch, Db, IVec, Tree};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{normalize_depth, StoreError, WellStore};
use crate::types::{Curve, EntityId, IngestBatch, Measurement, Well};

const WELLS_TREE: &str = "wells";
const FILENAMES_TREE: &str = "well_filenames";
const CURVES_TREE: &str = "curves";
const WELL_CURVES_TREE: &str = "well_curves";
const MEASUREMENTS_TREE: &str = "measurements";

/// A just-dropped handle keeps the file lock until sled's flusher exits.
const LOCK_RETRY_ATTEMPTS: u32 = 40;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(50);

fn is_lock_contention(err: &sled::Error) -> bool {
    matches!(err, sled::Error::Io(io) if io.kind() == std::io::ErrorKind::WouldBlock)
}

/// Sled database holding wells, curves and measurements.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    wells: Tree,
    filenames: Tree,
    curves: Tree,
    well_curves: Tree,
    measurements: Tree,
}

impl SledStore {
    /// Open or create the store at `path`.
    ///
    /// A held file lock is retried for up to two seconds before failing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        let mut attempt = 1;
        let db = loop {
            match sled::open(path_ref) {
                Ok(db) => break db,
                Err(e) if is_lock_contention(&e) && attempt < LOCK_RETRY_ATTEMPTS => {
                    if attempt == 1 {
                        warn!(path = %path_ref.display(), "Well store locked, waiting for release");
                    }
                    attempt += 1;
                    std::thread::sleep(LOCK_RETRY_DELAY);
                }
                Err(e) => return Err(e.into()),
            }
        };
        info!(path = %path_ref.display(), attempts = attempt, "Well store opened");
        Self::from_db(db)
    }

    /// Open a throwaway database removed on drop.
    pub fn open_temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        Ok(Self {
            wells: db.open_tree(WELLS_TREE)?,
            filenames: db.open_tree(FILENAMES_TREE)?,
            curves: db.open_tree(CURVES_TREE)?,
            well_curves: db.open_tree(WELL_CURVES_TREE)?,
            measurements: db.open_tree(MEASUREMENTS_TREE)?,
            db,
        })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    /// Database size in bytes
    pub fn size_bytes(&self) -> u64 {
        self.db.size_on_disk().unwrap_or(0)
    }
}

fn id_key(id: EntityId) -> [u8; 8] {
    id.to_be_bytes()
}

fn decode_id(bytes: &[u8]) -> Result<EntityId, StoreError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("id key of {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(raw))
}

fn pair_key(outer: EntityId, inner: EntityId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&outer.to_be_bytes());
    key[8..].copy_from_slice(&inner.to_be_bytes());
    key
}

/// Map an `f64` onto a `u64` whose unsigned order matches numeric order.
fn depth_bits(depth: f64) -> u64 {
    let bits = normalize_depth(depth).to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1 << 63)
    }
}

fn measurement_key(curve_id: EntityId, depth: f64, row: u32) -> [u8; 20] {
    let mut key = [0u8; 20];
    key[..8].copy_from_slice(&curve_id.to_be_bytes());
    key[8..16].copy_from_slice(&depth_bits(depth).to_be_bytes());
    key[16..].copy_from_slice(&row.to_be_bytes());
    key
}

fn decode<T: serde::de::DeserializeOwned>(value: &IVec) -> Result<T, StoreError> {
    Ok(serde_json::from_slice(value)?)
}

impl WellStore for SledStore {
    fn allocate_id(&self) -> Result<EntityId, StoreError> {
        // sled ids start at zero; keep zero free so it never names an entity
        Ok(self.db.generate_id()? + 1)
    }

    fn find_well_by_filename(&self, filename: &str) -> Result<Option<Well>, StoreError> {
        match self.filenames.get(filename.as_bytes())? {
            Some(id) => self.get_well(decode_id(&id)?),
            None => Ok(None),
        }
    }

    fn commit_ingestion(&self, batch: &IngestBatch) -> Result<(), StoreError> {
        let well = &batch.well;
        let well_key = id_key(well.id);
        let well_json = serde_json::to_vec(well)?;

        let mut curve_rows = Vec::with_capacity(batch.curves.len());
        for curve in &batch.curves {
            curve_rows.push((curve.id, serde_json::to_vec(curve)?));
        }

        // Row position per curve keeps keys unique when depths repeat
        let mut measurement_rows = Batch::default();
        let mut current_curve = None;
        let mut row: u32 = 0;
        for m in &batch.measurements {
            if current_curve != Some(m.curve_id) {
                current_curve = Some(m.curve_id);
                row = 0;
            }
            measurement_rows.insert(
                &measurement_key(m.curve_id, m.depth, row)[..],
                serde_json::to_vec(m)?,
            );
            row = row.wrapping_add(1);
        }

        let result = (
            &self.wells,
            &self.filenames,
            &self.curves,
            &self.well_curves,
            &self.measurements,
        )
            .transaction(|(wells, filenames, curves, well_curves, measurements)| {
                if let Some(existing) = filenames.get(well.original_filename.as_bytes())? {
                    return Err(ConflictableTransactionError::Abort(existing));
                }
                filenames.insert(well.original_filename.as_bytes(), &well_key[..])?;
                wells.insert(&well_key[..], well_json.as_slice())?;
                for (curve_id, json) in &curve_rows {
                    curves.insert(&id_key(*curve_id)[..], json.as_slice())?;
                    well_curves.insert(&pair_key(well.id, *curve_id)[..], Vec::<u8>::new())?;
                }
                measurements.apply_batch(&measurement_rows)?;
                Ok(())
            });

        match result {
            Ok(()) => {
                debug!(
                    well_id = well.id,
                    curves = batch.curves.len(),
                    measurements = batch.measurement_count(),
                    "Committed ingestion"
                );
                Ok(())
            }
            Err(TransactionError::Abort(existing)) => {
                let well_id = decode_id(&existing)?;
                let well_name = self
                    .get_well(well_id)?
                    .map(|w| w.name)
                    .unwrap_or_else(|| well.original_filename.clone());
                Err(StoreError::DuplicateFilename {
                    filename: well.original_filename.clone(),
                    well_id,
                    well_name,
                })
            }
            Err(TransactionError::Storage(e)) => Err(e.into()),
        }
    }

    fn list_wells(&self) -> Result<Vec<Well>, StoreError> {
        self.wells
            .iter()
            .map(|item| {
                let (_key, value) = item?;
                decode(&value)
            })
            .collect()
    }

    fn get_well(&self, well_id: EntityId) -> Result<Option<Well>, StoreError> {
        self.wells
            .get(id_key(well_id))?
            .map(|value| decode(&value))
            .transpose()
    }

    fn list_curves(&self, well_id: EntityId) -> Result<Vec<Curve>, StoreError> {
        let mut curves = Vec::new();
        for item in self.well_curves.scan_prefix(id_key(well_id)) {
            let (key, _) = item?;
            let curve_id = decode_id(&key[8..])?;
            if let Some(curve) = self.get_curve(curve_id)? {
                curves.push(curve);
            }
        }
        Ok(curves)
    }

    fn get_curve(&self, curve_id: EntityId) -> Result<Option<Curve>, StoreError> {
        self.curves
            .get(id_key(curve_id))?
            .map(|value| decode(&value))
            .transpose()
    }

    fn measurements_in_range(
        &self,
        curve_id: EntityId,
        min_depth: f64,
        max_depth: f64,
    ) -> Result<Vec<Measurement>, StoreError> {
        let start = measurement_key(curve_id, min_depth, 0);
        let end = measurement_key(curve_id, max_depth, u32::MAX);

        self.measurements
            .range(start..=end)
            .map(|item| {
                let (_key, value) = item?;
                decode(&value)
            })
            .collect()
    }

    fn count_measurements(&self, curve_id: EntityId) -> Result<usize, StoreError> {
        let mut count = 0;
        for item in self.measurements.scan_prefix(id_key(curve_id)) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    fn delete_well(&self, well_id: EntityId) -> Result<bool, StoreError> {
        let Some(well) = self.get_well(well_id)? else {
            return Ok(false);
        };

        // Curves of a committed well never change, so the key sets collected
        // here are complete.
        let mut curve_removals = Batch::default();
        let mut link_removals = Batch::default();
        let mut measurement_removals = Batch::default();
        let mut removed_measurements = 0usize;

        for item in self.well_curves.scan_prefix(id_key(well_id)) {
            let (link, _) = item?;
            let curve_id = decode_id(&link[8..])?;
            link_removals.remove(link);
            curve_removals.remove(&id_key(curve_id)[..]);
            for entry in self.measurements.scan_prefix(id_key(curve_id)) {
                let (key, _) = entry?;
                measurement_removals.remove(key);
                removed_measurements += 1;
            }
        }

        let well_key = id_key(well_id);
        let result: Result<(), TransactionError<()>> = (
            &self.wells,
            &self.filenames,
            &self.curves,
            &self.well_curves,
            &self.measurements,
        )
            .transaction(|(wells, filenames, curves, well_curves, measurements)| {
                wells.remove(&well_key[..])?;
                filenames.remove(well.original_filename.as_bytes())?;
                curves.apply_batch(&curve_removals)?;
                well_curves.apply_batch(&link_removals)?;
                measurements.apply_batch(&measurement_removals)?;
                Ok(())
            });

        match result {
            Ok(()) => {
                info!(
                    well_id,
                    measurements = removed_measurements,
                    "Deleted well and its curves"
                );
                Ok(true)
            }
            Err(TransactionError::Abort(())) => Ok(false),
            Err(TransactionError::Storage(e)) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}
