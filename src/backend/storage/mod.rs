// src/backend/storage/mod.rs
// Stable memory management using ic-stable-structures

pub mod config;
pub mod memory;
pub mod metrics;
pub mod notes;
pub mod storable;

// Re-export key storage structures and functions for easier access
pub use memory::Memory;
pub use metrics::{apply_event, metrics_snapshot};
pub use notes::{with_note_store, with_note_store_mut, InMemoryNoteStore, NoteStore, StableNoteStore};
pub use storable::{Cbor, NoteAccount};
