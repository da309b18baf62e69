//! The history journal: every invoice ever issued, in issue order.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invoicer_core::DomainResult;

use crate::service::{ServiceLine, total_of};

/// One issued invoice's billable content, independent of its number.
///
/// Entries are append-only: once written they are never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub client_alias: String,
    /// Serialized as `YYYY-MM-DD`.
    pub invoice_date: NaiveDate,
    pub services: Vec<ServiceLine>,
}

impl JournalEntry {
    pub fn new(
        client_alias: impl Into<String>,
        invoice_date: NaiveDate,
        services: Vec<ServiceLine>,
    ) -> Self {
        Self {
            client_alias: client_alias.into(),
            invoice_date,
            services,
        }
    }

    pub fn total(&self) -> DomainResult<Decimal> {
        total_of(&self.services)
    }
}

/// Ordered list of journal entries.
///
/// Insertion order is significant: regeneration numbers invoices in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryJournal {
    entries: Vec<JournalEntry>,
}

impl HistoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<JournalEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push `entry` to the end of the journal.
    pub fn append(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Entries whose invoice date falls in `[start, end]`, in journal order.
    pub fn between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Iterator<Item = &JournalEntry> + '_ {
        self.entries
            .iter()
            .filter(move |e| start <= e.invoice_date && e.invoice_date <= end)
    }
}
