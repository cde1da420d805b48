// src/backend/storage/memory.rs
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;
use std::cell::RefCell;

// Define Memory IDs for stable structures
// Choose non-overlapping IDs
const NOTES_MEM_ID: MemoryId = MemoryId::new(0);
const RECLAIMED_MEM_ID: MemoryId = MemoryId::new(1);
const METRICS_MEM_ID: MemoryId = MemoryId::new(2);
const DEPOSITS_MEM_ID: MemoryId = MemoryId::new(3);
// Config cells live at 10-12, see storage/config.rs

// Define memory type alias
pub type Memory = VirtualMemory<DefaultMemoryImpl>;

thread_local! {
    // Memory manager
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> = RefCell::new(
        MemoryManager::init(DefaultMemoryImpl::default())
    );
}

/// Get memory instance for a specific MemoryId.
pub fn get_memory(id: MemoryId) -> Memory {
    MEMORY_MANAGER.with(|m| m.borrow().get(id))
}

pub fn get_notes_memory() -> Memory {
    get_memory(NOTES_MEM_ID)
}

pub fn get_reclaimed_memory() -> Memory {
    get_memory(RECLAIMED_MEM_ID)
}

pub fn get_deposits_memory() -> Memory {
    get_memory(DEPOSITS_MEM_ID)
}

pub fn get_metrics_memory() -> Memory {
    get_memory(METRICS_MEM_ID)
}
