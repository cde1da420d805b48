// src/backend/models/init.rs
use candid::CandidType;
use serde::Deserialize;

/// Arguments accepted by `init` and `post_upgrade`. Unset fields keep the
/// currently stored value (or the default on a fresh install).
#[derive(CandidType, Deserialize, Debug, Clone, Default)]
pub struct InitArgs {
    pub deposit_per_byte_e8s: Option<u64>,
    pub min_cycles_threshold: Option<u128>,
    pub rate_limit_capacity: Option<u32>,
}
