use std::path::PathBuf;

use thiserror::Error;

use invoicer_invoicing::{HistoryJournal, JournalEntry};

/// Journal store operation error.
///
/// These are **infrastructure errors** (storage, parsing of persisted state) as
/// opposed to domain errors (validation).
#[derive(Debug, Error)]
pub enum JournalError {
    /// The persisted journal does not have the expected structure. Fatal; the
    /// operator has to repair the file by hand.
    #[error("journal {path} is corrupted: {source}")]
    Corruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("journal {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("journal store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store of journal entries.
///
/// ## Append Semantics
///
/// `append()` is a full read-modify-write: load the journal, push `entry` to the
/// end, persist the whole document. Entry order is preserved exactly; both
/// regeneration and reporting depend on it.
///
/// Implementations never edit or remove existing entries.
pub trait JournalStore {
    /// Load the full journal in insertion order.
    fn load(&self) -> Result<HistoryJournal, JournalError>;

    /// Append `entry` after every existing entry.
    fn append(&self, entry: JournalEntry) -> Result<(), JournalError>;
}

impl<S> JournalStore for &S
where
    S: JournalStore + ?Sized,
{
    fn load(&self) -> Result<HistoryJournal, JournalError> {
        (**self).load()
    }

    fn append(&self, entry: JournalEntry) -> Result<(), JournalError> {
        (**self).append(entry)
    }
}
