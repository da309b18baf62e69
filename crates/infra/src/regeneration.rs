//! Rebuild every invoice artifact from the journal.
//!
//! Regeneration is destructive for the output directory and the counter, so it
//! runs in phases:
//!
//! ```text
//! Resolving      consultant, every client alias and every entry total
//!   ↓
//! Backup         zip the current artifacts (abort here leaves everything untouched)
//!   ↓
//! Clear          empty the output directory
//!   ↓
//! ResetCounter   counter := 1
//!   ↓
//! Emitting       one invoice per journal entry, in journal order
//! ```
//!
//! Journal entries are never touched. Running twice with the same journal
//! yields the same numbers, the same artifacts and the same final counter.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use thiserror::Error;

use invoicer_core::DomainError;
use invoicer_invoicing::{
    Client, DirectoryError, HistoryJournal, Invoice, InvoiceNumber, PartyDirectory,
};

use crate::output::OutputError;
use crate::publish::{PublishError, Publisher};
use crate::sequencer::{NumberSequencer, SequencerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerationPhase {
    Resolving,
    Backup,
    Clear,
    ResetCounter,
    Emitting,
    Complete,
}

impl fmt::Display for RegenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolving => "resolving",
            Self::Backup => "backup",
            Self::Clear => "clear",
            Self::ResetCounter => "reset_counter",
            Self::Emitting => "emitting",
            Self::Complete => "complete",
        })
    }
}

#[derive(Debug, Error)]
pub enum RegenerationError {
    #[error("backup of the output directory failed, nothing was cleared: {0}")]
    Backup(#[source] OutputError),

    #[error("clearing the output directory failed: {0}")]
    Clear(#[source] OutputError),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error("consultant record: {0}")]
    Consultant(#[source] DirectoryError),

    #[error("journal entry #{index} (client {alias:?}): {source}")]
    Directory {
        index: usize,
        alias: String,
        #[source]
        source: DirectoryError,
    },

    #[error("journal entry #{index}: {source}")]
    Amount {
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error("invoice {number}: {source}")]
    Publish {
        number: InvoiceNumber,
        #[source]
        source: PublishError,
    },
}

/// One emitted invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedInvoice {
    pub number: InvoiceNumber,
    pub artifact: PathBuf,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerationReport {
    /// `None` when the output directory held nothing to back up.
    pub backup: Option<PathBuf>,
    pub issued: Vec<IssuedInvoice>,
}

pub struct RegenerationEngine<'a, N, D> {
    sequencer: &'a N,
    parties: &'a D,
    publisher: &'a Publisher,
}

impl<'a, N, D> RegenerationEngine<'a, N, D>
where
    N: NumberSequencer,
    D: PartyDirectory,
{
    pub fn new(sequencer: &'a N, parties: &'a D, publisher: &'a Publisher) -> Self {
        Self {
            sequencer,
            parties,
            publisher,
        }
    }

    /// Back up, clear, reset the counter and re-emit one invoice per entry of
    /// `journal`. `started_at` names the backup archive.
    pub fn run(
        &self,
        journal: &HistoryJournal,
        started_at: NaiveDateTime,
    ) -> Result<RegenerationReport, RegenerationError> {
        enter(RegenerationPhase::Resolving);
        let consultant = self
            .parties
            .consultant()
            .map_err(RegenerationError::Consultant)?;
        let resolved = journal
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let client = self.parties.client(&entry.client_alias).map_err(|source| {
                    RegenerationError::Directory {
                        index,
                        alias: entry.client_alias.clone(),
                        source,
                    }
                })?;
                let total = entry
                    .total()
                    .map_err(|source| RegenerationError::Amount { index, source })?;
                Ok((client, total))
            })
            .collect::<Result<Vec<(Client, Decimal)>, RegenerationError>>()?;

        enter(RegenerationPhase::Backup);
        let output = self.publisher.output();
        let backup = output.backup(started_at).map_err(RegenerationError::Backup)?;

        enter(RegenerationPhase::Clear);
        output.clear().map_err(RegenerationError::Clear)?;

        enter(RegenerationPhase::ResetCounter);
        self.sequencer.reset()?;

        enter(RegenerationPhase::Emitting);
        let mut issued = Vec::with_capacity(journal.len());
        for (entry, (client, total)) in journal.entries().iter().zip(resolved) {
            let sequence = self.sequencer.advance()?;
            let invoice = Invoice::issue(&client, entry, sequence);
            let artifact = self
                .publisher
                .publish(&consultant, &client, &invoice)
                .map_err(|source| RegenerationError::Publish {
                    number: invoice.number.clone(),
                    source,
                })?;
            issued.push(IssuedInvoice {
                total,
                number: invoice.number,
                artifact,
            });
        }

        enter(RegenerationPhase::Complete);
        tracing::info!(invoices = issued.len(), "regeneration complete");
        Ok(RegenerationReport { backup, issued })
    }
}

fn enter(phase: RegenerationPhase) {
    tracing::info!(%phase, "regeneration phase");
}
