pub mod common;
pub mod init;
pub mod note;

// Re-export common types for easier access
pub use common::*;
pub use note::Note;
