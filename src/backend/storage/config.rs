// src/backend/storage/config.rs
use crate::models::common::Cycles;
use crate::models::init::InitArgs;
use crate::storage::memory::{get_memory, Memory};
use crate::storage::storable::Cbor;
use crate::utils::log::log_info;
use ic_stable_structures::{memory_manager::MemoryId, StableCell};
use std::cell::RefCell;

// Define Memory IDs for config cells (ensure these are unique)
const DEPOSIT_PER_BYTE_MEM_ID: MemoryId = MemoryId::new(10);
const MIN_CYCLES_THRESHOLD_MEM_ID: MemoryId = MemoryId::new(11);
const RATE_LIMIT_CAPACITY_MEM_ID: MemoryId = MemoryId::new(12);

// Default values (used when the cell is uninitialized)
pub const DEFAULT_DEPOSIT_PER_BYTE_E8S: u64 = 10;
pub const DEFAULT_MIN_CYCLES_THRESHOLD: Cycles = 10_000_000_000; // 10B cycles
pub const DEFAULT_RATE_LIMIT_CAPACITY: u32 = 20;

thread_local! {
    /// Deposit locked per allocated record byte, in e8s.
    static DEPOSIT_PER_BYTE: RefCell<StableCell<u64, Memory>> = RefCell::new(
        StableCell::init(get_memory(DEPOSIT_PER_BYTE_MEM_ID), DEFAULT_DEPOSIT_PER_BYTE_E8S)
            .expect("Failed to initialize deposit rate stable cell")
    );

    /// Stable cell for the Minimum Cycles Threshold
    static MIN_CYCLES_THRESHOLD: RefCell<StableCell<Cbor<Cycles>, Memory>> = RefCell::new(
        StableCell::init(get_memory(MIN_CYCLES_THRESHOLD_MEM_ID), Cbor(DEFAULT_MIN_CYCLES_THRESHOLD))
            .expect("Failed to initialize min cycles threshold stable cell")
    );

    /// Burst capacity of the per-caller rate limiter
    static RATE_LIMIT_CAPACITY: RefCell<StableCell<u32, Memory>> = RefCell::new(
        StableCell::init(get_memory(RATE_LIMIT_CAPACITY_MEM_ID), DEFAULT_RATE_LIMIT_CAPACITY)
            .expect("Failed to initialize rate limit capacity stable cell")
    );
}

/// Applies the values present in `args`; absent fields keep their stored value.
/// Called during canister initialization and upgrade.
pub fn apply_init_args(args: &InitArgs) -> Result<(), String> {
    if let Some(rate) = args.deposit_per_byte_e8s {
        DEPOSIT_PER_BYTE.with(|cell| {
            cell.borrow_mut()
                .set(rate)
                .map(|_| ())
                .map_err(|e| format!("Failed to set deposit rate: {:?}", e))
        })?;
    }
    if let Some(threshold) = args.min_cycles_threshold {
        MIN_CYCLES_THRESHOLD.with(|cell| {
            cell.borrow_mut()
                .set(Cbor(threshold))
                .map(|_| ())
                .map_err(|e| format!("Failed to set min cycles threshold: {:?}", e))
        })?;
    }
    if let Some(capacity) = args.rate_limit_capacity {
        RATE_LIMIT_CAPACITY.with(|cell| {
            cell.borrow_mut()
                .set(capacity)
                .map(|_| ())
                .map_err(|e| format!("Failed to set rate limit capacity: {:?}", e))
        })?;
    }
    log_info!(
        "Configuration applied: DepositPerByte={}, MinCycles={}, RateCapacity={}",
        get_deposit_per_byte_e8s(),
        get_min_cycles_threshold(),
        get_rate_limit_capacity()
    );
    Ok(())
}

pub fn get_deposit_per_byte_e8s() -> u64 {
    DEPOSIT_PER_BYTE.with(|cell| *cell.borrow().get())
}

pub fn get_min_cycles_threshold() -> Cycles {
    MIN_CYCLES_THRESHOLD.with(|cell| cell.borrow().get().0)
}

pub fn get_rate_limit_capacity() -> u32 {
    RATE_LIMIT_CAPACITY.with(|cell| *cell.borrow().get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_then_partial_override() {
        assert_eq!(get_deposit_per_byte_e8s(), DEFAULT_DEPOSIT_PER_BYTE_E8S);
        assert_eq!(get_rate_limit_capacity(), DEFAULT_RATE_LIMIT_CAPACITY);

        apply_init_args(&InitArgs {
            deposit_per_byte_e8s: Some(3),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(get_deposit_per_byte_e8s(), 3);
        assert_eq!(get_min_cycles_threshold(), DEFAULT_MIN_CYCLES_THRESHOLD);
        assert_eq!(get_rate_limit_capacity(), DEFAULT_RATE_LIMIT_CAPACITY);
    }
}
