// src/backend/utils/crypto.rs
// Deterministic note address derivation.

use crate::error::NoteError;
use crate::models::common::{AuthorId, NoteAddress, ID_LEN};
use candid::Principal;
use elliptic_curve::sec1::{EncodedPoint, FromEncodedPoint};
use p256::{AffinePoint, NistP256};
use sha2::{Digest, Sha256};

/// Domain-separation tag for note records.
pub const NOTE_SEED: &[u8] = b"note";

const DERIVED_ADDRESS_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Whether `x` is the x-coordinate of a point on the P-256 curve.
///
/// Addresses that decode as a curve point could double as a public key, so
/// derivation only accepts digests that fail this check.
pub fn is_on_curve(x: &[u8; ID_LEN]) -> bool {
    let mut sec1 = [0u8; ID_LEN + 1];
    sec1[0] = 0x02;
    sec1[1..].copy_from_slice(x);
    match EncodedPoint::<NistP256>::from_bytes(sec1) {
        Ok(point) => AffinePoint::from_encoded_point(&point).is_some().into(),
        Err(_) => false,
    }
}

/// Hashes the note seeds with an explicit bump. Fails if the result lands on
/// the curve.
pub fn create_note_address(
    program_id: &Principal,
    author: &AuthorId,
    title: &str,
    bump: u8,
) -> Result<NoteAddress, NoteError> {
    let program = program_id.as_slice();
    let mut hasher = Sha256::new();
    hasher.update(NOTE_SEED);
    hasher.update(author.as_bytes());
    hasher.update(title.as_bytes());
    hasher.update([bump]);
    hasher.update([program.len() as u8]);
    hasher.update(program);
    hasher.update(DERIVED_ADDRESS_MARKER);
    let digest: [u8; ID_LEN] = hasher.finalize().into();

    if is_on_curve(&digest) {
        return Err(NoteError::AddressDerivationFailed);
    }
    Ok(NoteAddress::from_bytes(digest))
}

/// Finds the canonical note address for `(author, title)`: the first
/// off-curve digest searching the bump from 255 downwards.
pub fn find_note_address(
    program_id: &Principal,
    author: &AuthorId,
    title: &str,
) -> Result<(NoteAddress, u8), NoteError> {
    for bump in (0..=u8::MAX).rev() {
        if let Ok(address) = create_note_address(program_id, author, title, bump) {
            return Ok((address, bump));
        }
    }
    Err(NoteError::AddressDerivationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn program() -> Principal {
        Principal::from_slice(&[0, 0, 0, 0, 0, 0, 0, 1, 1, 1])
    }

    fn author(seed: u8) -> AuthorId {
        AuthorId::from(Principal::from_slice(&[seed; 29]))
    }

    #[test]
    fn generator_x_coordinate_is_on_curve() {
        let gx: [u8; 32] = hex::decode(
            "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296",
        )
        .unwrap()
        .try_into()
        .unwrap();
        assert!(is_on_curve(&gx));
        assert!(!is_on_curve(&[0xff; 32]));
    }

    #[test]
    fn found_address_matches_explicit_bump() {
        let (address, bump) = find_note_address(&program(), &author(1), "My Title").unwrap();
        assert_eq!(
            create_note_address(&program(), &author(1), "My Title", bump).unwrap(),
            address
        );
        assert!(!is_on_curve(address.as_bytes()));
    }

    #[test]
    fn program_id_separates_address_spaces() {
        let other = Principal::from_slice(&[0, 0, 0, 0, 0, 0, 0, 2, 1, 1]);
        let (a, _) = find_note_address(&program(), &author(1), "t").unwrap();
        let (b, _) = find_note_address(&other, &author(1), "t").unwrap();
        assert_ne!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_derivation_is_deterministic(seed in any::<u8>(), title in ".{1,40}") {
            let first = find_note_address(&program(), &author(seed), &title).unwrap();
            let second = find_note_address(&program(), &author(seed), &title).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_distinct_inputs_give_distinct_addresses(
            seed_a in any::<u8>(),
            seed_b in any::<u8>(),
            title_a in ".{1,40}",
            title_b in ".{1,40}",
        ) {
            prop_assume!(seed_a != seed_b || title_a != title_b);
            let (a, _) = find_note_address(&program(), &author(seed_a), &title_a).unwrap();
            let (b, _) = find_note_address(&program(), &author(seed_b), &title_b).unwrap();
            prop_assert_ne!(a, b);
        }
    }
}
