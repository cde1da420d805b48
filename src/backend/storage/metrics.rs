// src/backend/storage/metrics.rs
use crate::error::NoteError;
use crate::metrics::{NoteEvent, NoteMetrics};
use crate::storage::memory::{get_metrics_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableCell;
use std::cell::RefCell;

thread_local! {
    /// Note counters, kept across upgrades.
    static METRICS_CELL: RefCell<StableCell<Cbor<NoteMetrics>, Memory>> = RefCell::new(
        StableCell::init(get_metrics_memory(), Cbor(NoteMetrics::default()))
            .expect("Failed to initialize metrics stable cell")
    );
}

pub fn metrics_snapshot() -> NoteMetrics {
    METRICS_CELL.with(|cell| cell.borrow().get().0.clone())
}

/// Folds `event` into the persisted counters and returns the new totals.
pub fn apply_event(event: NoteEvent) -> Result<NoteMetrics, NoteError> {
    METRICS_CELL.with(|cell| {
        let mut cell = cell.borrow_mut();
        let mut metrics = cell.get().0.clone();
        metrics.apply(event);
        cell.set(Cbor(metrics.clone()))
            .map_err(|e| NoteError::StorageError(format!("metrics cell write failed: {:?}", e)))?;
        Ok(metrics)
    })
}
