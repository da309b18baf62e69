//! Invoicing domain module.
//!
//! This crate contains the billable-work model (service lines, journal
//! entries, the history journal) and the transient invoice derived from it,
//! implemented purely as deterministic domain logic (no IO, no clock, no
//! storage).

pub mod invoice;
pub mod journal;
pub mod party;
pub mod service;

pub use invoice::{Invoice, InvoiceNumber};
pub use journal::{HistoryJournal, JournalEntry};
pub use party::{Client, Consultant, DirectoryError, PartyDirectory};
pub use service::{ServiceLine, total_of};
