use crate::error::NoteError;
use crate::models::common::Cycles;
use crate::utils::log::log_warn;
use candid::Principal;

/// Checks if the canister has sufficient cycles.
///
/// # Errors
///
/// Returns `NoteError::CycleLow` if the balance is below the threshold.
pub fn check_cycles(balance: Cycles, threshold: Cycles) -> Result<(), NoteError> {
    if balance < threshold {
        log_warn!(
            "Cycle balance low: {} cycles, threshold: {}",
            balance,
            threshold
        );
        Err(NoteError::CycleLow)
    } else {
        Ok(())
    }
}

/// Only signed callers may create, update or delete notes.
///
/// # Errors
///
/// Returns `NoteError::AnonymousCaller` for the anonymous principal.
pub fn reject_anonymous(caller: Principal) -> Result<(), NoteError> {
    if caller == Principal::anonymous() {
        Err(NoteError::AnonymousCaller)
    } else {
        Ok(())
    }
}
