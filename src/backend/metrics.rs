// src/backend/metrics.rs
use crate::storage::{apply_event, metrics_snapshot};
use crate::utils::log::log_warn;
use candid::{CandidType, Deserialize};
use serde::Serialize;

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteMetrics {
    pub total_notes: u64,
    pub notes_created_total: u64,
    pub notes_updated_total: u64,
    pub notes_deleted_total: u64,
    pub rejected_total: u64,
    pub deposits_reclaimed_e8s: u64,
}

/// Kinds of outcome recorded by the API layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEvent {
    Created,
    Updated,
    Deleted { refund_e8s: u64 },
    Rejected,
}

impl NoteMetrics {
    pub fn apply(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::Created => {
                self.total_notes = self.total_notes.saturating_add(1);
                self.notes_created_total = self.notes_created_total.saturating_add(1);
            }
            NoteEvent::Updated => {
                self.notes_updated_total = self.notes_updated_total.saturating_add(1);
            }
            NoteEvent::Deleted { refund_e8s } => {
                self.total_notes = self.total_notes.saturating_sub(1);
                self.notes_deleted_total = self.notes_deleted_total.saturating_add(1);
                self.deposits_reclaimed_e8s = self.deposits_reclaimed_e8s.saturating_add(refund_e8s);
            }
            NoteEvent::Rejected => {
                self.rejected_total = self.rejected_total.saturating_add(1);
            }
        }
    }
}

/// Records `event` in the stable metrics cell. Failures are logged, never surfaced.
pub fn record(event: NoteEvent) {
    if let Err(e) = apply_event(event) {
        log_warn!("Dropped metrics event {:?}: {}", event, e);
    }
}

pub fn get_note_metrics() -> NoteMetrics {
    metrics_snapshot()
}
