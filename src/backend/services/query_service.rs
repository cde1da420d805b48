// src/backend/services/query_service.rs
use crate::{
    error::NoteError,
    models::common::{AuthorId, NoteAddress},
    models::note::Note,
    storage::NoteStore,
};

/// Every note authored by `owner`, in no guaranteed order.
///
/// The iterator is lazy and borrows `store`; call again to restart the scan.
/// An owner without notes yields an empty sequence.
pub fn list_owned_by<'a, S: NoteStore>(
    store: &'a S,
    owner: &AuthorId,
) -> impl Iterator<Item = (NoteAddress, Note)> + 'a {
    let owner = *owner;
    // Stores may pre-filter loosely; the author check here is authoritative.
    store
        .scan_by_author(&owner)
        .filter(move |(_, note)| note.author == owner)
}

/// Reads the note at `address`.
pub fn get_note<S: NoteStore>(store: &S, address: &NoteAddress) -> Result<Note, NoteError> {
    store
        .get(address)?
        .ok_or_else(|| NoteError::NotFound(address.to_hex()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::note_service::NoteService;
    use crate::storage::InMemoryNoteStore;
    use candid::Principal;

    fn author(seed: u8) -> AuthorId {
        AuthorId::from(Principal::from_slice(&[seed; 29]))
    }

    fn seeded_store() -> InMemoryNoteStore {
        let mut store = InMemoryNoteStore::new();
        let mut svc = NoteService::new(&mut store, Principal::anonymous(), 1);
        for owner in 1..=4u8 {
            for i in 0..owner {
                svc.create(author(owner), format!("note-{}", i), format!("from {}", owner), 1)
                    .unwrap();
            }
        }
        store
    }

    #[test]
    fn lists_exactly_the_owners_notes() {
        let store = seeded_store();
        for owner in 1..=4u8 {
            let notes: Vec<Note> = list_owned_by(&store, &author(owner)).map(|(_, n)| n).collect();
            assert_eq!(notes.len(), owner as usize);
            assert!(notes.iter().all(|n| n.author == author(owner)));
        }
    }

    #[test]
    fn owner_without_notes_gets_empty_listing() {
        let store = seeded_store();
        assert_eq!(list_owned_by(&store, &author(99)).count(), 0);
        assert_eq!(list_owned_by(&InMemoryNoteStore::new(), &author(1)).count(), 0);
    }

    #[test]
    fn listing_is_restartable() {
        let store = seeded_store();
        let first: Vec<NoteAddress> = list_owned_by(&store, &author(3)).map(|(a, _)| a).collect();
        let second: Vec<NoteAddress> = list_owned_by(&store, &author(3)).map(|(a, _)| a).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn get_note_reports_missing_address() {
        let store = seeded_store();
        let (address, note) = list_owned_by(&store, &author(2)).next().unwrap();
        assert_eq!(get_note(&store, &address).unwrap(), note);
        assert!(matches!(
            get_note(&store, &NoteAddress::from_bytes([0; 32])),
            Err(NoteError::NotFound(_))
        ));
    }
}
