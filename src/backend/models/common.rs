// src/backend/models/common.rs
use crate::error::NoteError;
use candid::Principal;
use std::fmt;

pub type TimestampMs = i64; // Milliseconds since epoch
pub type TimestampNs = u64; // Nanoseconds since epoch, as reported by the IC
pub type Cycles = u128;

/// Width of every identifier on the wire (author ids and note addresses).
pub const ID_LEN: usize = 32;

/// Fixed-width identity of a note's author.
///
/// Built canonically from a principal: byte 0 carries the principal length,
/// the principal bytes follow, and the remainder is zero. Principals never
/// exceed 29 bytes, so every principal has exactly one `AuthorId`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuthorId([u8; ID_LEN]);

impl AuthorId {
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        AuthorId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn to_principal(&self) -> Result<Principal, NoteError> {
        let len = self.0[0] as usize;
        if len >= ID_LEN {
            return Err(NoteError::InvalidInput(format!(
                "author id length byte {} out of range",
                len
            )));
        }
        Principal::try_from_slice(&self.0[1..=len])
            .map_err(|e| NoteError::InvalidInput(format!("author id is not a principal: {}", e)))
    }
}

impl From<Principal> for AuthorId {
    fn from(principal: Principal) -> Self {
        let raw = principal.as_slice();
        let mut bytes = [0u8; ID_LEN];
        bytes[0] = raw.len() as u8;
        bytes[1..=raw.len()].copy_from_slice(raw);
        AuthorId(bytes)
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_principal() {
            Ok(principal) => write!(f, "{}", principal),
            Err(_) => write!(f, "{}", hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorId({})", self)
    }
}

/// Location of a note record in the program's address space.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteAddress([u8; ID_LEN]);

impl NoteAddress {
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        NoteAddress(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<&[u8]> for NoteAddress {
    type Error = NoteError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let fixed: [u8; ID_LEN] = bytes.try_into().map_err(|_| {
            NoteError::InvalidInput(format!(
                "note address must be {} bytes, got {}",
                ID_LEN,
                bytes.len()
            ))
        })?;
        Ok(NoteAddress(fixed))
    }
}

impl fmt::Display for NoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for NoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteAddress({})", self.to_hex())
    }
}
