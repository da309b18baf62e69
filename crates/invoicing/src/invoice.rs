use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invoicer_core::{DomainResult, ValueObject};

use crate::journal::JournalEntry;
use crate::party::Client;
use crate::service::{ServiceLine, total_of};

/// Display-facing invoice identifier: `{client short name}-{date}-{sequence}`.
///
/// Never persisted on its own; it is re-derived from the journal and the
/// counter on every regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceNumber {
    pub short_name: String,
    pub date: NaiveDate,
    pub sequence: u64,
}

impl InvoiceNumber {
    pub fn new(short_name: impl Into<String>, date: NaiveDate, sequence: u64) -> Self {
        Self {
            short_name: short_name.into(),
            date,
            sequence,
        }
    }
}

impl ValueObject for InvoiceNumber {}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.short_name,
            self.date.format("%Y-%m-%d"),
            self.sequence
        )
    }
}

/// Transient invoice: a journal entry plus a minted number, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    pub number: InvoiceNumber,
    pub date: NaiveDate,
    pub services: Vec<ServiceLine>,
}

impl Invoice {
    /// Build the invoice for `entry`, numbered with the client's short name and
    /// the given counter value.
    pub fn issue(client: &Client, entry: &JournalEntry, sequence: u64) -> Self {
        Self {
            number: InvoiceNumber::new(client.short_name.clone(), entry.invoice_date, sequence),
            date: entry.invoice_date,
            services: entry.services.clone(),
        }
    }

    pub fn total(&self) -> DomainResult<Decimal> {
        total_of(&self.services)
    }

    /// The journal entry this invoice was (or will be) recorded as.
    pub fn to_entry(&self, client_alias: impl Into<String>) -> JournalEntry {
        JournalEntry::new(client_alias, self.date, self.services.clone())
    }
}
