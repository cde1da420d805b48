// src/backend/models/note.rs
use crate::error::NoteError;
use crate::models::common::{AuthorId, TimestampMs, ID_LEN};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_CONTENT_LEN: usize = 1000;

/// First 8 bytes of `SHA-256("account:Note")`. Prefixes every stored record.
pub const NOTE_DISCRIMINATOR: [u8; 8] = [203, 75, 252, 196, 81, 210, 122, 126];

const LEN_PREFIX: usize = 4;
const TIMESTAMP_LEN: usize = 8;

/// Byte offset of the author field in the wire layout.
pub const AUTHOR_OFFSET: usize = NOTE_DISCRIMINATOR.len();

/// A single persisted note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub author: AuthorId,
    pub title: String,
    pub content: String,
    pub created_at: TimestampMs,
    pub last_updated: TimestampMs,
}

impl Note {
    /// Space allocated for every record, sized for the maximum-bound layout.
    pub const SPACE: usize = NOTE_DISCRIMINATOR.len()
        + ID_LEN
        + LEN_PREFIX
        + MAX_TITLE_LEN
        + LEN_PREFIX
        + MAX_CONTENT_LEN
        + TIMESTAMP_LEN
        + TIMESTAMP_LEN;

    /// Encodes the record into its fixed-size account layout.
    pub fn to_account_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SPACE);
        buf.extend_from_slice(&NOTE_DISCRIMINATOR);
        buf.extend_from_slice(self.author.as_bytes());
        write_str(&mut buf, &self.title);
        write_str(&mut buf, &self.content);
        buf.extend_from_slice(&self.created_at.to_le_bytes());
        buf.extend_from_slice(&self.last_updated.to_le_bytes());
        buf.resize(Self::SPACE.max(buf.len()), 0);
        buf
    }

    /// Decodes a record previously written by [`Note::to_account_bytes`].
    pub fn from_account_bytes(bytes: &[u8]) -> Result<Note, NoteError> {
        let mut reader = Reader { bytes, pos: 0 };
        if reader.take(NOTE_DISCRIMINATOR.len())? != NOTE_DISCRIMINATOR {
            return Err(NoteError::StorageError(
                "account discriminator does not match Note".to_string(),
            ));
        }
        let mut author = [0u8; ID_LEN];
        author.copy_from_slice(reader.take(ID_LEN)?);
        let title = reader.read_str(MAX_TITLE_LEN)?;
        let content = reader.read_str(MAX_CONTENT_LEN)?;
        let created_at = reader.read_i64()?;
        let last_updated = reader.read_i64()?;
        Ok(Note {
            author: AuthorId::from_bytes(author),
            title,
            content,
            created_at,
            last_updated,
        })
    }
}

/// Title must be 1..=100 bytes.
pub fn validate_title(title: &str) -> Result<(), NoteError> {
    if title.is_empty() {
        return Err(NoteError::TitleEmpty);
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(NoteError::TitleTooLong);
    }
    Ok(())
}

/// Content must be 1..=1000 bytes.
pub fn validate_content(content: &str) -> Result<(), NoteError> {
    if content.is_empty() {
        return Err(NoteError::ContentEmpty);
    }
    if content.len() > MAX_CONTENT_LEN {
        return Err(NoteError::ContentTooLong);
    }
    Ok(())
}

fn write_str(buf: &mut Vec<u8>, value: &str) {
    buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buf.extend_from_slice(value.as_bytes());
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], NoteError> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(NoteError::StorageError(format!(
                "note account truncated at offset {}",
                self.pos
            ))),
        }
    }

    fn read_str(&mut self, max: usize) -> Result<String, NoteError> {
        let mut len = [0u8; LEN_PREFIX];
        len.copy_from_slice(self.take(LEN_PREFIX)?);
        let len = u32::from_le_bytes(len) as usize;
        if len > max {
            return Err(NoteError::StorageError(format!(
                "string length {} exceeds bound {}",
                len, max
            )));
        }
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|e| NoteError::StorageError(format!("invalid utf-8 in note: {}", e)))
    }

    fn read_i64(&mut self) -> Result<i64, NoteError> {
        let mut raw = [0u8; TIMESTAMP_LEN];
        raw.copy_from_slice(self.take(TIMESTAMP_LEN)?);
        Ok(i64::from_le_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Principal;
    use sha2::{Digest, Sha256};

    fn sample(title: &str, content: &str) -> Note {
        Note {
            author: AuthorId::from(Principal::from_slice(&[9u8; 29])),
            title: title.to_string(),
            content: content.to_string(),
            created_at: 1_700_000_000_000,
            last_updated: 1_700_000_000_500,
        }
    }

    #[test]
    fn discriminator_is_hash_of_account_name() {
        let digest = Sha256::digest(b"account:Note");
        assert_eq!(&digest[..8], &NOTE_DISCRIMINATOR);
    }

    #[test]
    fn space_matches_layout() {
        assert_eq!(Note::SPACE, 1164);
    }

    #[test]
    fn max_bound_record_fits_allocated_space() {
        let note = sample(&"t".repeat(MAX_TITLE_LEN), &"c".repeat(MAX_CONTENT_LEN));
        let bytes = note.to_account_bytes();
        assert_eq!(bytes.len(), Note::SPACE);
        assert_eq!(Note::from_account_bytes(&bytes).unwrap(), note);
    }

    #[test]
    fn small_record_is_padded_and_author_sits_at_offset_eight() {
        let note = sample("My Title", "Hello");
        let bytes = note.to_account_bytes();
        assert_eq!(bytes.len(), Note::SPACE);
        assert_eq!(&bytes[AUTHOR_OFFSET..AUTHOR_OFFSET + ID_LEN], note.author.as_bytes());
        assert_eq!(Note::from_account_bytes(&bytes).unwrap(), note);
    }

    #[test]
    fn decode_rejects_foreign_discriminator() {
        let mut bytes = sample("a", "b").to_account_bytes();
        bytes[0] ^= 0xff;
        assert!(matches!(
            Note::from_account_bytes(&bytes),
            Err(NoteError::StorageError(_))
        ));
    }

    #[test]
    fn decode_rejects_truncated_and_oversized_fields() {
        let bytes = sample("a", "b").to_account_bytes();
        assert!(Note::from_account_bytes(&bytes[..20]).is_err());

        let mut oversized = bytes.clone();
        let title_len = AUTHOR_OFFSET + ID_LEN;
        oversized[title_len..title_len + 4].copy_from_slice(&101u32.to_le_bytes());
        assert!(Note::from_account_bytes(&oversized).is_err());
    }

    #[test]
    fn title_bounds() {
        assert_eq!(validate_title(""), Err(NoteError::TitleEmpty));
        assert_eq!(validate_title(&"x".repeat(101)), Err(NoteError::TitleTooLong));
        assert!(validate_title(&"x".repeat(100)).is_ok());
        assert!(validate_title("x").is_ok());
    }

    #[test]
    fn content_bounds() {
        assert_eq!(validate_content(""), Err(NoteError::ContentEmpty));
        assert_eq!(validate_content(&"x".repeat(1001)), Err(NoteError::ContentTooLong));
        assert!(validate_content(&"x".repeat(1000)).is_ok());
    }

    #[test]
    fn bounds_count_utf8_bytes() {
        // 34 * 3 bytes = 102 bytes, 34 chars
        let wide = "\u{20ac}".repeat(34);
        assert_eq!(validate_title(&wide), Err(NoteError::TitleTooLong));
    }
}
