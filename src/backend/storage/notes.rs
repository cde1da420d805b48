// src/backend/storage/notes.rs
use crate::error::NoteError;
use crate::models::common::{AuthorId, NoteAddress};
use crate::models::note::Note;
use crate::storage::memory::{get_deposits_memory, get_notes_memory, get_reclaimed_memory, Memory};
use crate::storage::storable::NoteAccount;
use crate::utils::log::log_warn;
use ic_ledger_types::Tokens;
use ic_stable_structures::{Memory as StableMemory, StableBTreeMap};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// Mapping from note location to record, the deposit each record locks, and
/// the ledger of deposits returned to owners when their notes are deleted.
///
/// The state machine only ever sees a store through this trait.
pub trait NoteStore {
    fn get(&self, address: &NoteAddress) -> Result<Option<Note>, NoteError>;

    fn contains(&self, address: &NoteAddress) -> bool;

    /// Writes `note` at `address`, replacing whatever was there.
    fn put(&mut self, address: NoteAddress, note: &Note) -> Result<(), NoteError>;

    fn remove(&mut self, address: &NoteAddress) -> Result<Option<Note>, NoteError>;

    /// Every record in the store, in no particular order.
    fn scan(&self) -> Box<dyn Iterator<Item = (NoteAddress, Note)> + '_>;

    /// Records whose author is `author`. Stores may override this with a
    /// cheaper pre-filter.
    fn scan_by_author(&self, author: &AuthorId) -> Box<dyn Iterator<Item = (NoteAddress, Note)> + '_> {
        let author = *author;
        Box::new(self.scan().filter(move |(_, note)| note.author == author))
    }

    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records `amount` as held by the note at `address`.
    fn lock_deposit(&mut self, address: NoteAddress, amount: Tokens);

    /// Deposit currently held by the note at `address`, zero if none.
    fn locked_deposit(&self, address: &NoteAddress) -> Tokens;

    /// Drops the deposit held at `address` and returns what it was.
    fn release_deposit(&mut self, address: &NoteAddress) -> Tokens;

    /// Adds `amount` to `recipient`'s reclaimed balance and returns the new balance.
    fn credit(&mut self, recipient: &AuthorId, amount: Tokens) -> Tokens;

    fn reclaimed_balance(&self, owner: &AuthorId) -> Tokens;
}

/// Heap-backed store, used off-chain and in tests.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: BTreeMap<NoteAddress, Note>,
    deposits: HashMap<NoteAddress, u64>,
    reclaimed: HashMap<AuthorId, u64>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStore for InMemoryNoteStore {
    fn get(&self, address: &NoteAddress) -> Result<Option<Note>, NoteError> {
        Ok(self.notes.get(address).cloned())
    }

    fn contains(&self, address: &NoteAddress) -> bool {
        self.notes.contains_key(address)
    }

    fn put(&mut self, address: NoteAddress, note: &Note) -> Result<(), NoteError> {
        self.notes.insert(address, note.clone());
        Ok(())
    }

    fn remove(&mut self, address: &NoteAddress) -> Result<Option<Note>, NoteError> {
        Ok(self.notes.remove(address))
    }

    fn scan(&self) -> Box<dyn Iterator<Item = (NoteAddress, Note)> + '_> {
        Box::new(self.notes.iter().map(|(address, note)| (*address, note.clone())))
    }

    fn len(&self) -> u64 {
        self.notes.len() as u64
    }

    fn lock_deposit(&mut self, address: NoteAddress, amount: Tokens) {
        self.deposits.insert(address, amount.e8s());
    }

    fn locked_deposit(&self, address: &NoteAddress) -> Tokens {
        Tokens::from_e8s(self.deposits.get(address).copied().unwrap_or(0))
    }

    fn release_deposit(&mut self, address: &NoteAddress) -> Tokens {
        Tokens::from_e8s(self.deposits.remove(address).unwrap_or(0))
    }

    fn credit(&mut self, recipient: &AuthorId, amount: Tokens) -> Tokens {
        let balance = self.reclaimed.entry(*recipient).or_insert(0);
        *balance = balance.saturating_add(amount.e8s());
        Tokens::from_e8s(*balance)
    }

    fn reclaimed_balance(&self, owner: &AuthorId) -> Tokens {
        Tokens::from_e8s(self.reclaimed.get(owner).copied().unwrap_or(0))
    }
}

/// Store over stable memory. Records are kept in their raw account layout.
pub struct StableNoteStore<M: StableMemory> {
    notes: StableBTreeMap<NoteAddress, NoteAccount, M>,
    deposits: StableBTreeMap<NoteAddress, u64, M>,
    reclaimed: StableBTreeMap<AuthorId, u64, M>,
}

impl<M: StableMemory> StableNoteStore<M> {
    pub fn init(notes_memory: M, deposits_memory: M, reclaimed_memory: M) -> Self {
        StableNoteStore {
            notes: StableBTreeMap::init(notes_memory),
            deposits: StableBTreeMap::init(deposits_memory),
            reclaimed: StableBTreeMap::init(reclaimed_memory),
        }
    }

    /// Raw account bytes at `address`, as a client fetching the account would see them.
    pub fn get_account(&self, address: &NoteAddress) -> Option<NoteAccount> {
        self.notes.get(address)
    }
}

fn decode_entry(address: NoteAddress, account: &NoteAccount) -> Option<(NoteAddress, Note)> {
    match account.decode() {
        Ok(note) => Some((address, note)),
        Err(e) => {
            log_warn!("Skipping unreadable note account {}: {}", address, e);
            None
        }
    }
}

impl<M: StableMemory> NoteStore for StableNoteStore<M> {
    fn get(&self, address: &NoteAddress) -> Result<Option<Note>, NoteError> {
        self.notes
            .get(address)
            .map(|account| account.decode())
            .transpose()
    }

    fn contains(&self, address: &NoteAddress) -> bool {
        self.notes.contains_key(address)
    }

    fn put(&mut self, address: NoteAddress, note: &Note) -> Result<(), NoteError> {
        let account = NoteAccount::encode(note)?;
        self.notes.insert(address, account);
        Ok(())
    }

    fn remove(&mut self, address: &NoteAddress) -> Result<Option<Note>, NoteError> {
        self.notes
            .remove(address)
            .map(|account| account.decode())
            .transpose()
    }

    fn scan(&self) -> Box<dyn Iterator<Item = (NoteAddress, Note)> + '_> {
        Box::new(
            self.notes
                .iter()
                .filter_map(|(address, account)| decode_entry(address, &account)),
        )
    }

    fn scan_by_author(&self, author: &AuthorId) -> Box<dyn Iterator<Item = (NoteAddress, Note)> + '_> {
        let author = *author;
        Box::new(
            self.notes
                .iter()
                .filter(move |(_, account)| account.author_bytes() == Some(&author.as_bytes()[..]))
                .filter_map(|(address, account)| decode_entry(address, &account)),
        )
    }

    fn len(&self) -> u64 {
        self.notes.len()
    }

    fn lock_deposit(&mut self, address: NoteAddress, amount: Tokens) {
        self.deposits.insert(address, amount.e8s());
    }

    fn locked_deposit(&self, address: &NoteAddress) -> Tokens {
        Tokens::from_e8s(self.deposits.get(address).unwrap_or(0))
    }

    fn release_deposit(&mut self, address: &NoteAddress) -> Tokens {
        Tokens::from_e8s(self.deposits.remove(address).unwrap_or(0))
    }

    fn credit(&mut self, recipient: &AuthorId, amount: Tokens) -> Tokens {
        let balance = self
            .reclaimed
            .get(recipient)
            .unwrap_or(0)
            .saturating_add(amount.e8s());
        self.reclaimed.insert(*recipient, balance);
        Tokens::from_e8s(balance)
    }

    fn reclaimed_balance(&self, owner: &AuthorId) -> Tokens {
        Tokens::from_e8s(self.reclaimed.get(owner).unwrap_or(0))
    }
}

thread_local! {
    /// Canister note store: Key = NoteAddress, Value = raw Note account.
    static NOTES: RefCell<StableNoteStore<Memory>> = RefCell::new(
        StableNoteStore::init(get_notes_memory(), get_deposits_memory(), get_reclaimed_memory())
    );
}

/// Runs `f` against the canister's note store.
pub fn with_note_store<R>(f: impl FnOnce(&StableNoteStore<Memory>) -> R) -> R {
    NOTES.with(|store| f(&store.borrow()))
}

/// Runs `f` against the canister's note store with write access.
pub fn with_note_store_mut<R>(f: impl FnOnce(&mut StableNoteStore<Memory>) -> R) -> R {
    NOTES.with(|store| f(&mut store.borrow_mut()))
}
