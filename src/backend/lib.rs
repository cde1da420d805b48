// src/backend/lib.rs

pub mod api;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

use api::*;
use candid::Principal;
use error::NoteError;
use models::init::InitArgs;
use serde_bytes::ByteBuf;
use utils::log::log_info;

fn apply_config(args: Option<InitArgs>) {
    if let Err(e) = storage::config::apply_init_args(&args.unwrap_or_default()) {
        ic_cdk::trap(&e);
    }
    api::reload_rate_limit_capacity();
}

#[ic_cdk::init]
fn init(args: Option<InitArgs>) {
    apply_config(args);
    log_info!("Notes backend canister initialized.");
}

#[ic_cdk::post_upgrade]
fn post_upgrade(args: Option<InitArgs>) {
    apply_config(args);
    log_info!(
        "Notes backend canister upgraded, {} notes in store.",
        storage::with_note_store(|store| storage::NoteStore::len(store))
    );
}

// Export Candid interface
ic_cdk::export_candid!();
