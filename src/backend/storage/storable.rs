// src/backend/storage/storable.rs
use crate::error::NoteError;
use crate::models::common::{AuthorId, NoteAddress, ID_LEN};
use crate::models::note::{Note, AUTHOR_OFFSET};
use ic_stable_structures::{storable::Bound, Storable};
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;

/// Helper struct to wrap any type T that implements Serialize and DeserializeOwned
/// to make it Storable using CBOR encoding.
#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct Cbor<T>(pub T)
where
    T: Serialize + DeserializeOwned;

impl<T> Storable for Cbor<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self) -> Cow<[u8]> {
        let mut writer = vec![];
        ciborium::ser::into_writer(&self.0, &mut writer)
            .expect("Failed to serialize value to CBOR for stable storage");
        Cow::Owned(writer)
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        let value: T = ciborium::de::from_reader(bytes.as_ref())
            .expect("Failed to deserialize value from CBOR from stable storage");
        Cbor(value)
    }

    const BOUND: Bound = Bound::Unbounded;
}

const ID_BOUND: Bound = Bound::Bounded {
    max_size: ID_LEN as u32,
    is_fixed_size: true,
};

fn fixed_id(bytes: &[u8]) -> [u8; ID_LEN] {
    let mut id = [0u8; ID_LEN];
    let n = bytes.len().min(ID_LEN);
    id[..n].copy_from_slice(&bytes[..n]);
    id
}

impl Storable for NoteAddress {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Borrowed(&self.as_bytes()[..])
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        NoteAddress::from_bytes(fixed_id(&bytes))
    }

    const BOUND: Bound = ID_BOUND;
}

impl Storable for AuthorId {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Borrowed(&self.as_bytes()[..])
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        AuthorId::from_bytes(fixed_id(&bytes))
    }

    const BOUND: Bound = ID_BOUND;
}

/// Raw note record in its fixed-size account layout.
///
/// Kept undecoded in stable memory so owner scans can compare the author
/// bytes in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteAccount(Vec<u8>);

impl NoteAccount {
    pub fn encode(note: &Note) -> Result<Self, NoteError> {
        let bytes = note.to_account_bytes();
        if bytes.len() != Note::SPACE {
            return Err(NoteError::StorageError(format!(
                "encoded note is {} bytes, account space is {}",
                bytes.len(),
                Note::SPACE
            )));
        }
        Ok(NoteAccount(bytes))
    }

    pub fn decode(&self) -> Result<Note, NoteError> {
        Note::from_account_bytes(&self.0)
    }

    pub fn author_bytes(&self) -> Option<&[u8]> {
        self.0.get(AUTHOR_OFFSET..AUTHOR_OFFSET + ID_LEN)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Storable for NoteAccount {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Borrowed(&self.0[..])
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        NoteAccount(bytes.into_owned())
    }

    const BOUND: Bound = Bound::Bounded {
        max_size: Note::SPACE as u32,
        is_fixed_size: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;

    #[test]
    fn cbor_wrapper_round_trips() {
        let value = Cbor(vec![1u64, 2, 3]);
        let restored: Cbor<Vec<u64>> = Cbor::from_bytes(value.to_bytes());
        assert_eq!(restored, value);
    }

    #[test]
    fn oversized_note_cannot_become_an_account() {
        let note = Note {
            author: AuthorId::from(Principal::anonymous()),
            title: "t".repeat(150),
            content: "c".repeat(1000),
            created_at: 0,
            last_updated: 0,
        };
        assert!(matches!(
            NoteAccount::encode(&note),
            Err(NoteError::StorageError(_))
        ));
    }

    #[test]
    fn account_exposes_author_slice() {
        let author = AuthorId::from(Principal::from_slice(&[4; 29]));
        let note = Note {
            author,
            title: "t".into(),
            content: "c".into(),
            created_at: 1,
            last_updated: 1,
        };
        let account = NoteAccount::encode(&note).unwrap();
        assert_eq!(account.author_bytes(), Some(&author.as_bytes()[..]));
        assert_eq!(account.decode().unwrap(), note);
    }
}
