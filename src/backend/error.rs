// src/backend/error.rs
use candid::CandidType;
use serde::Deserialize;
use thiserror::Error;

#[derive(CandidType, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error("Title cannot be longer than 100 bytes")]
    TitleTooLong,

    #[error("Content cannot be longer than 1000 bytes")]
    ContentTooLong,

    #[error("Title cannot be empty")]
    TitleEmpty,

    #[error("Content cannot be empty")]
    ContentEmpty,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Note already exists: {0}")]
    AlreadyExists(String),

    #[error("No off-curve bump seed found for note address")]
    AddressDerivationFailed,

    #[error("Anonymous callers cannot modify notes")]
    AnonymousCaller,

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Canister cycle balance too low for operation")]
    CycleLow,
}

impl NoteError {
    /// Stable numeric code, matching the program's published error table.
    pub fn code(&self) -> u32 {
        match self {
            NoteError::TitleTooLong => 6000,
            NoteError::ContentTooLong => 6001,
            NoteError::TitleEmpty => 6002,
            NoteError::ContentEmpty => 6003,
            NoteError::Unauthorized(_) => 6004,
            NoteError::NotFound(_) => 6005,
            NoteError::AlreadyExists(_) => 6006,
            NoteError::AddressDerivationFailed => 6007,
            NoteError::AnonymousCaller => 6008,
            NoteError::RateLimitExceeded(_) => 6009,
            NoteError::InvalidInput(_) => 6010,
            NoteError::StorageError(_) => 6011,
            NoteError::CycleLow => 6012,
        }
    }

    /// Short machine name, used as the `validator` error code for field checks.
    pub fn name(&self) -> &'static str {
        match self {
            NoteError::TitleTooLong => "TitleTooLong",
            NoteError::ContentTooLong => "ContentTooLong",
            NoteError::TitleEmpty => "TitleEmpty",
            NoteError::ContentEmpty => "ContentEmpty",
            NoteError::Unauthorized(_) => "Unauthorized",
            NoteError::NotFound(_) => "NotFound",
            NoteError::AlreadyExists(_) => "AlreadyExists",
            NoteError::AddressDerivationFailed => "AddressDerivationFailed",
            NoteError::AnonymousCaller => "AnonymousCaller",
            NoteError::RateLimitExceeded(_) => "RateLimitExceeded",
            NoteError::InvalidInput(_) => "InvalidInput",
            NoteError::StorageError(_) => "StorageError",
            NoteError::CycleLow => "CycleLow",
        }
    }

    /// Inverse of [`NoteError::name`] for the field-validation kinds.
    pub fn from_validation_code(code: &str) -> Option<NoteError> {
        match code {
            "TitleTooLong" => Some(NoteError::TitleTooLong),
            "ContentTooLong" => Some(NoteError::ContentTooLong),
            "TitleEmpty" => Some(NoteError::TitleEmpty),
            "ContentEmpty" => Some(NoteError::ContentEmpty),
            _ => None,
        }
    }
}
