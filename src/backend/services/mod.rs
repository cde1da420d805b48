pub mod note_service;
pub mod query_service;
