//! Completed-path records — the external caching collaborator.
//!
//! Persistence of records (and any byte format) belongs to the host; the
//! search core only defines the contract and ships an in-memory
//! implementation for tests and single-process embedding.

use std::sync::Mutex;

use trek_core::{Cell, Cost, ModeSet};

use crate::path::Path;

/// A completed trial result, eligible for reuse by identical requests.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathRecord {
    pub origin: Cell,
    pub destination: Cell,
    /// The modes the recorded path actually uses.  A request may replay the
    /// record only if this is a subset of its allowed modes.
    pub modes: ModeSet,
    pub path: Path,
}

/// Store and look up completed paths.
///
/// `lookup` keys on `(origin, destination)` and filters by allowed mode
/// set; among eligible records the cheapest wins.  Implementations must be
/// callable from worker context.
pub trait PathRecordManager: Send + Sync {
    fn lookup(&self, origin: Cell, destination: Cell, allowed: ModeSet) -> Option<Path>;

    fn record(&self, record: &PathRecord);
}

// ── MemoryRecords ─────────────────────────────────────────────────────────────

/// A process-local [`PathRecordManager`] backed by a `Vec` behind a mutex.
///
/// Linear scan is fine at the scale a single process accumulates; hosts
/// with real volume bring their own store.
#[derive(Default)]
pub struct MemoryRecords {
    inner: Mutex<Vec<PathRecord>>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PathRecordManager for MemoryRecords {
    fn lookup(&self, origin: Cell, destination: Cell, allowed: ModeSet) -> Option<Path> {
        let records = self.inner.lock().unwrap();
        records
            .iter()
            .filter(|r| {
                r.origin == origin && r.destination == destination && r.modes.is_subset_of(allowed)
            })
            .min_by_key(|r| r.path.cost())
            .map(|r| r.path.clone())
    }

    fn record(&self, record: &PathRecord) {
        debug_assert!(record.path.is_valid(), "recording an invalid path");
        let mut records = self.inner.lock().unwrap();

        // Keep at most one record per (origin, destination, modes) key.
        if let Some(existing) = records.iter_mut().find(|r| {
            r.origin == record.origin
                && r.destination == record.destination
                && r.modes == record.modes
        }) {
            if record.path.cost() < existing.path.cost() {
                *existing = record.clone();
            }
            return;
        }
        records.push(record.clone());
    }
}

/// Convenience for asserting on stored costs in tests.
impl MemoryRecords {
    pub fn cheapest_cost(&self, origin: Cell, destination: Cell) -> Option<Cost> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.origin == origin && r.destination == destination)
            .map(|r| r.path.cost())
            .min()
    }
}
