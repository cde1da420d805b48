// src/backend/services/note_service.rs
// Note state machine: create, update and delete over an explicit store.

use crate::{
    error::NoteError,
    models::{
        common::{AuthorId, NoteAddress, TimestampMs},
        note::{validate_content, validate_title, Note},
    },
    storage::NoteStore,
    utils::{
        crypto::find_note_address,
        log::{log_info, log_warn},
    },
};
use candid::Principal;
use ic_ledger_types::Tokens;

/// Result of a successful delete: what was freed and who received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReclaimReceipt {
    pub address: NoteAddress,
    pub recipient: AuthorId,
    pub reclaimed_bytes: u64,
    pub refund: Tokens,
}

/// Deposit a note record locks when created at `deposit_per_byte_e8s`.
pub fn note_deposit(deposit_per_byte_e8s: u64) -> Tokens {
    Tokens::from_e8s((Note::SPACE as u64).saturating_mul(deposit_per_byte_e8s))
}

/// Applies note operations against `store`.
///
/// Callers pass the already-authenticated identity of whoever authorized the
/// operation; this service only decides whether that identity owns the record.
pub struct NoteService<'a, S: NoteStore> {
    store: &'a mut S,
    program_id: Principal,
    deposit_per_byte_e8s: u64,
}

impl<'a, S: NoteStore> NoteService<'a, S> {
    pub fn new(store: &'a mut S, program_id: Principal, deposit_per_byte_e8s: u64) -> Self {
        NoteService {
            store,
            program_id,
            deposit_per_byte_e8s,
        }
    }

    /// Location of `author`'s note titled `title`.
    pub fn address_of(&self, author: &AuthorId, title: &str) -> Result<NoteAddress, NoteError> {
        find_note_address(&self.program_id, author, title).map(|(address, _bump)| address)
    }

    /// Creates a new note owned by `author`.
    ///
    /// # Errors
    /// * Title/content bound violations, checked title first.
    /// * `AlreadyExists` if `author` already has a note with this title.
    pub fn create(
        &mut self,
        author: AuthorId,
        title: String,
        content: String,
        now: TimestampMs,
    ) -> Result<NoteAddress, NoteError> {
        validate_title(&title)?;
        validate_content(&content)?;

        let address = self.address_of(&author, &title)?;
        if self.store.contains(&address) {
            return Err(NoteError::AlreadyExists(format!(
                "{} already has a note titled {:?} at {}",
                author, title, address
            )));
        }

        let note = Note {
            author,
            title,
            content,
            created_at: now,
            last_updated: now,
        };
        let deposit = note_deposit(self.deposit_per_byte_e8s);
        self.store.put(address, &note)?;
        self.store.lock_deposit(address, deposit);
        log_info!(
            "Note {} created by {} (deposit {} e8s)",
            address,
            author,
            deposit.e8s()
        );
        Ok(address)
    }

    /// Replaces the content of the note at `address`.
    ///
    /// # Errors
    /// * Content bound violations.
    /// * `NotFound` if nothing lives at `address`.
    /// * `Unauthorized` if `caller` is not the note's author.
    pub fn update(
        &mut self,
        caller: AuthorId,
        address: NoteAddress,
        content: String,
        now: TimestampMs,
    ) -> Result<Note, NoteError> {
        validate_content(&content)?;
        let mut note = self.load_owned(&caller, &address)?;

        note.content = content;
        note.last_updated = now.max(note.last_updated);
        self.store.put(address, &note)?;
        log_info!("Note {} updated by {}", address, caller);
        Ok(note)
    }

    /// [`NoteService::update`] addressed by the caller's title instead of
    /// location. Returns the location alongside the updated record.
    pub fn update_by_title(
        &mut self,
        caller: AuthorId,
        title: &str,
        content: String,
        now: TimestampMs,
    ) -> Result<(NoteAddress, Note), NoteError> {
        let address = self.address_of(&caller, title)?;
        let note = self.update(caller, address, content, now)?;
        Ok((address, note))
    }

    /// Deletes the note at `address` and credits the deposit it locked at
    /// creation to `recipient`.
    ///
    /// # Errors
    /// * `NotFound` if nothing lives at `address`.
    /// * `Unauthorized` if `caller` is not the author, or `recipient` is not
    ///   the author.
    pub fn delete(
        &mut self,
        caller: AuthorId,
        address: NoteAddress,
        recipient: AuthorId,
    ) -> Result<ReclaimReceipt, NoteError> {
        let note = self.load_owned(&caller, &address)?;
        if recipient != note.author {
            log_warn!(
                "Rejected delete of {}: refund recipient {} is not the author",
                address,
                recipient
            );
            return Err(NoteError::Unauthorized(format!(
                "Refund recipient {} is not the author of note {}",
                recipient, address
            )));
        }

        self.store.remove(&address)?;
        let refund = self.store.release_deposit(&address);
        self.store.credit(&note.author, refund);
        log_info!(
            "Note {} deleted by {}, {} e8s returned",
            address,
            caller,
            refund.e8s()
        );
        Ok(ReclaimReceipt {
            address,
            recipient: note.author,
            reclaimed_bytes: Note::SPACE as u64,
            refund,
        })
    }

    /// [`NoteService::delete`] addressed by title, refunding the caller.
    pub fn delete_by_title(&mut self, caller: AuthorId, title: &str) -> Result<ReclaimReceipt, NoteError> {
        let address = self.address_of(&caller, title)?;
        self.delete(caller, address, caller)
    }

    fn load_owned(&self, caller: &AuthorId, address: &NoteAddress) -> Result<Note, NoteError> {
        let note = self
            .store
            .get(address)?
            .ok_or_else(|| NoteError::NotFound(address.to_hex()))?;
        if note.author != *caller {
            log_warn!(
                "Rejected access by {} to note {}: caller is not the author",
                caller,
                address
            );
            return Err(NoteError::Unauthorized(format!(
                "Caller {} is not the author of note {}",
                caller, address
            )));
        }
        Ok(note)
    }
}
