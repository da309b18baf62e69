use std::sync::RwLock;

use invoicer_invoicing::{HistoryJournal, JournalEntry};

use super::r#trait::{JournalError, JournalStore};

/// In-memory journal.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    journal: RwLock<HistoryJournal>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<JournalEntry>) -> Self {
        Self {
            journal: RwLock::new(HistoryJournal::from_entries(entries)),
        }
    }
}

impl JournalStore for InMemoryJournal {
    fn load(&self) -> Result<HistoryJournal, JournalError> {
        let journal = self
            .journal
            .read()
            .map_err(|_| JournalError::Unavailable("lock poisoned".to_string()))?;
        Ok(journal.clone())
    }

    fn append(&self, entry: JournalEntry) -> Result<(), JournalError> {
        let mut journal = self
            .journal
            .write()
            .map_err(|_| JournalError::Unavailable("lock poisoned".to_string()))?;
        journal.append(entry);
        Ok(())
    }
}
