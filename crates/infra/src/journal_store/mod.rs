//! Append-only journal store boundary.
//!
//! The journal is the single source of truth for billed work. This module
//! defines the storage-facing abstraction plus a file-backed and an in-memory
//! implementation.

pub mod file;
pub mod in_memory;
pub mod r#trait;

pub use file::FileJournal;
pub use in_memory::InMemoryJournal;
pub use r#trait::{JournalError, JournalStore};
