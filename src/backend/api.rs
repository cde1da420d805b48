// src/backend/api.rs
// Candid API endpoint definitions (query/update functions)

use crate::{
    error::NoteError,
    metrics::{self, NoteEvent, NoteMetrics},
    models::{
        common::{AuthorId, NoteAddress, TimestampMs},
        note::{self, Note},
    },
    services::{
        note_service::{NoteService, ReclaimReceipt},
        query_service::{get_note as read_note, list_owned_by},
    },
    storage::{config, with_note_store, with_note_store_mut, NoteStore},
    utils::{
        crypto::find_note_address,
        guards::{check_cycles, reject_anonymous},
        rate_limit::RateLimiter,
        time::{get_current_time_ms, get_current_time_ns},
    },
};
use candid::{CandidType, Deserialize, Principal};
use ic_cdk::api::canister_balance128;
use ic_cdk::caller;
use ic_cdk_macros::{query, update};
use serde_bytes::ByteBuf;
use std::cell::RefCell;
use validator::{Validate, ValidationError, ValidationErrors};

thread_local! {
    // In-memory rate limiter. Cleared on upgrade.
    static RATE_LIMITER: RefCell<RateLimiter> = RefCell::new(
        RateLimiter::new(config::get_rate_limit_capacity())
    );
}

/// Picks up a capacity change made through init args.
pub fn reload_rate_limit_capacity() {
    RATE_LIMITER.with(|limiter| {
        limiter
            .borrow_mut()
            .set_capacity(config::get_rate_limit_capacity())
    });
}

// --- Validation Helpers ---

fn to_validation_error(err: NoteError) -> ValidationError {
    ValidationError::new(err.name())
}

fn validate_title_field(title: &str) -> Result<(), ValidationError> {
    note::validate_title(title).map_err(to_validation_error)
}

fn validate_content_field(content: &str) -> Result<(), ValidationError> {
    note::validate_content(content).map_err(to_validation_error)
}

/// Maps the first failing field, in `fields` order, back to its `NoteError`.
fn first_field_error(errors: &ValidationErrors, fields: &[&str]) -> NoteError {
    let field_errors = errors.field_errors();
    fields
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .filter_map(|errs| errs.first())
        .find_map(|err| NoteError::from_validation_code(&err.code))
        .unwrap_or_else(|| NoteError::InvalidInput(errors.to_string()))
}

fn validate_request<T: Validate>(req: &T, fields: &[&str]) -> Result<(), NoteError> {
    req.validate()
        .map_err(|errors| first_field_error(&errors, fields))
}

fn parse_address(raw: &ByteBuf) -> Result<NoteAddress, NoteError> {
    NoteAddress::try_from(raw.as_slice())
}

// --- Request/Response Structs ---

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct CreateNoteRequest {
    #[validate(custom(function = "validate_title_field"))]
    pub title: String,
    #[validate(custom(function = "validate_content_field"))]
    pub content: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct UpdateNoteRequest {
    pub address: ByteBuf,
    #[validate(custom(function = "validate_content_field"))]
    pub content: String,
}

#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct DeleteNoteRequest {
    pub address: ByteBuf,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct UpdateNoteByTitleRequest {
    #[validate(custom(function = "validate_title_field"))]
    pub title: String,
    #[validate(custom(function = "validate_content_field"))]
    pub content: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct DeleteNoteByTitleRequest {
    #[validate(custom(function = "validate_title_field"))]
    pub title: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NoteView {
    pub address: ByteBuf,
    pub author: Principal,
    pub title: String,
    pub content: String,
    pub created_at: TimestampMs,
    pub last_updated: TimestampMs,
}

impl NoteView {
    pub fn from_entry(address: NoteAddress, note: Note) -> Result<Self, NoteError> {
        Ok(NoteView {
            address: ByteBuf::from(address.as_bytes().to_vec()),
            author: note.author.to_principal()?,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            last_updated: note.last_updated,
        })
    }
}

#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct DerivedAddress {
    pub address: ByteBuf,
    pub bump: u8,
}

#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct DeleteNoteResponse {
    pub address: ByteBuf,
    pub reclaimed_bytes: u64,
    pub refund_e8s: u64,
    pub reclaimed_balance_e8s: u64,
}

impl DeleteNoteResponse {
    pub fn from_receipt<S: NoteStore>(store: &S, receipt: &ReclaimReceipt) -> Self {
        DeleteNoteResponse {
            address: ByteBuf::from(receipt.address.as_bytes().to_vec()),
            reclaimed_bytes: receipt.reclaimed_bytes,
            refund_e8s: receipt.refund.e8s(),
            reclaimed_balance_e8s: store.reclaimed_balance(&receipt.recipient).e8s(),
        }
    }
}

#[derive(CandidType, Deserialize, Clone, Debug, Default)]
pub struct GetMetricsResponse {
    pub metrics: NoteMetrics,
    pub cycle_balance: u128,
}

// --- Guards ---

/// Identity allowed to mutate notes in this call.
fn authorize_mutation() -> Result<AuthorId, NoteError> {
    let caller = caller();
    reject_anonymous(caller)?;
    check_cycles(canister_balance128(), config::get_min_cycles_threshold())?;
    RATE_LIMITER.with(|limiter| limiter.borrow_mut().check(caller, get_current_time_ns()))?;
    Ok(AuthorId::from(caller))
}

/// Records the outcome of a state-changing call in the metrics cell.
fn track<T>(result: Result<T, NoteError>, event: impl FnOnce(&T) -> NoteEvent) -> Result<T, NoteError> {
    match &result {
        Ok(value) => metrics::record(event(value)),
        Err(_) => metrics::record(NoteEvent::Rejected),
    }
    result
}

// --- Note Endpoints ---

#[update]
fn create_note(req: CreateNoteRequest) -> Result<ByteBuf, NoteError> {
    let result = (|| -> Result<NoteAddress, NoteError> {
        validate_request(&req, &["title", "content"])?;
        let author = authorize_mutation()?;
        let now = get_current_time_ms();
        with_note_store_mut(|store| {
            NoteService::new(store, ic_cdk::id(), config::get_deposit_per_byte_e8s())
                .create(author, req.title, req.content, now)
        })
    })();
    track(result, |_| NoteEvent::Created).map(|address| ByteBuf::from(address.as_bytes().to_vec()))
}

#[update]
fn update_note(req: UpdateNoteRequest) -> Result<NoteView, NoteError> {
    let result = (|| -> Result<NoteView, NoteError> {
        validate_request(&req, &["content"])?;
        let address = parse_address(&req.address)?;
        let caller = authorize_mutation()?;
        let now = get_current_time_ms();
        let note = with_note_store_mut(|store| {
            NoteService::new(store, ic_cdk::id(), config::get_deposit_per_byte_e8s())
                .update(caller, address, req.content, now)
        })?;
        NoteView::from_entry(address, note)
    })();
    track(result, |_| NoteEvent::Updated)
}

#[update]
fn delete_note(req: DeleteNoteRequest) -> Result<DeleteNoteResponse, NoteError> {
    let result = (|| -> Result<DeleteNoteResponse, NoteError> {
        let address = parse_address(&req.address)?;
        let caller = authorize_mutation()?;
        with_note_store_mut(|store| -> Result<DeleteNoteResponse, NoteError> {
            let receipt = NoteService::new(store, ic_cdk::id(), config::get_deposit_per_byte_e8s())
                .delete(caller, address, caller)?;
            Ok(DeleteNoteResponse::from_receipt(&*store, &receipt))
        })
    })();
    track(result, |response| NoteEvent::Deleted {
        refund_e8s: response.refund_e8s,
    })
}

#[update]
fn update_note_by_title(req: UpdateNoteByTitleRequest) -> Result<NoteView, NoteError> {
    let result = (|| -> Result<NoteView, NoteError> {
        validate_request(&req, &["title", "content"])?;
        let caller = authorize_mutation()?;
        let now = get_current_time_ms();
        let (address, note) = with_note_store_mut(|store| {
            NoteService::new(store, ic_cdk::id(), config::get_deposit_per_byte_e8s())
                .update_by_title(caller, &req.title, req.content, now)
        })?;
        NoteView::from_entry(address, note)
    })();
    track(result, |_| NoteEvent::Updated)
}

#[update]
fn delete_note_by_title(req: DeleteNoteByTitleRequest) -> Result<DeleteNoteResponse, NoteError> {
    let result = (|| -> Result<DeleteNoteResponse, NoteError> {
        validate_request(&req, &["title"])?;
        let caller = authorize_mutation()?;
        with_note_store_mut(|store| -> Result<DeleteNoteResponse, NoteError> {
            let receipt = NoteService::new(store, ic_cdk::id(), config::get_deposit_per_byte_e8s())
                .delete_by_title(caller, &req.title)?;
            Ok(DeleteNoteResponse::from_receipt(&*store, &receipt))
        })
    })();
    track(result, |response| NoteEvent::Deleted {
        refund_e8s: response.refund_e8s,
    })
}

// --- Query Endpoints ---

fn list_for(owner: Principal) -> Result<Vec<NoteView>, NoteError> {
    with_note_store(|store| {
        list_owned_by(store, &AuthorId::from(owner))
            .map(|(address, note)| NoteView::from_entry(address, note))
            .collect()
    })
}

#[query]
fn list_my_notes() -> Result<Vec<NoteView>, NoteError> {
    list_for(caller())
}

#[query]
fn list_notes_by_owner(owner: Principal) -> Result<Vec<NoteView>, NoteError> {
    list_for(owner)
}

#[query]
fn get_note(address: ByteBuf) -> Result<NoteView, NoteError> {
    let address = parse_address(&address)?;
    let note = with_note_store(|store| read_note(store, &address))?;
    NoteView::from_entry(address, note)
}

/// Raw account bytes in the fixed record layout.
#[query]
fn get_note_account(address: ByteBuf) -> Result<ByteBuf, NoteError> {
    let address = parse_address(&address)?;
    with_note_store(|store| store.get_account(&address))
        .map(|account| ByteBuf::from(account.as_bytes().to_vec()))
        .ok_or_else(|| NoteError::NotFound(address.to_hex()))
}

#[query]
fn derive_note_address(owner: Principal, title: String) -> Result<DerivedAddress, NoteError> {
    let (address, bump) = find_note_address(&ic_cdk::id(), &AuthorId::from(owner), &title)?;
    Ok(DerivedAddress {
        address: ByteBuf::from(address.as_bytes().to_vec()),
        bump,
    })
}

#[query]
fn reclaimed_balance() -> u64 {
    let owner = AuthorId::from(caller());
    with_note_store(|store| store.reclaimed_balance(&owner).e8s())
}

#[query]
fn get_metrics() -> GetMetricsResponse {
    GetMetricsResponse {
        metrics: metrics::get_note_metrics(),
        cycle_balance: canister_balance128(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reports_title_before_content() {
        let req = CreateNoteRequest {
            title: String::new(),
            content: "c".repeat(1001),
        };
        assert_eq!(
            validate_request(&req, &["title", "content"]),
            Err(NoteError::TitleEmpty)
        );

        let req = CreateNoteRequest {
            title: "ok".into(),
            content: "c".repeat(1001),
        };
        assert_eq!(
            validate_request(&req, &["title", "content"]),
            Err(NoteError::ContentTooLong)
        );
    }

    #[test]
    fn valid_create_request_passes() {
        let req = CreateNoteRequest {
            title: "t".repeat(100),
            content: "c".repeat(1000),
        };
        assert!(validate_request(&req, &["title", "content"]).is_ok());
    }

    #[test]
    fn update_request_checks_content() {
        let req = UpdateNoteRequest {
            address: ByteBuf::from(vec![0u8; 32]),
            content: String::new(),
        };
        assert_eq!(validate_request(&req, &["content"]), Err(NoteError::ContentEmpty));
    }

    #[test]
    fn title_addressed_requests_check_title_first() {
        let req = UpdateNoteByTitleRequest {
            title: "t".repeat(101),
            content: String::new(),
        };
        assert_eq!(
            validate_request(&req, &["title", "content"]),
            Err(NoteError::TitleTooLong)
        );
        let req = DeleteNoteByTitleRequest { title: String::new() };
        assert_eq!(validate_request(&req, &["title"]), Err(NoteError::TitleEmpty));
    }

    #[test]
    fn delete_response_reports_refund_and_balance() {
        use crate::services::note_service::note_deposit;
        use crate::storage::InMemoryNoteStore;

        let author = AuthorId::from(Principal::from_slice(&[6; 29]));
        let program = Principal::from_slice(&[0, 0, 0, 0, 0, 0, 0, 3, 1, 1]);
        let mut store = InMemoryNoteStore::new();
        let mut svc = NoteService::new(&mut store, program, 10);
        svc.create(author, "t".into(), "c".into(), 1).unwrap();
        let receipt = svc.delete_by_title(author, "t").unwrap();

        let response = DeleteNoteResponse::from_receipt(&store, &receipt);
        assert_eq!(response.address.as_slice(), &receipt.address.as_bytes()[..]);
        assert_eq!(response.refund_e8s, note_deposit(10).e8s());
        assert_eq!(response.reclaimed_balance_e8s, note_deposit(10).e8s());
        assert_eq!(response.reclaimed_bytes, Note::SPACE as u64);
    }

    #[test]
    fn address_must_be_32_bytes() {
        assert!(parse_address(&ByteBuf::from(vec![1u8; 32])).is_ok());
        assert!(matches!(
            parse_address(&ByteBuf::from(vec![1u8; 3])),
            Err(NoteError::InvalidInput(_))
        ));
    }

    #[test]
    fn note_view_carries_principal_author() {
        let owner = Principal::from_slice(&[6; 29]);
        let note = Note {
            author: AuthorId::from(owner),
            title: "t".into(),
            content: "c".into(),
            created_at: 1,
            last_updated: 2,
        };
        let view = NoteView::from_entry(NoteAddress::from_bytes([8; 32]), note).unwrap();
        assert_eq!(view.author, owner);
        assert_eq!(view.address.as_slice(), &[8u8; 32][..]);
        assert_eq!(view.last_updated, 2);
    }
}
