//! Mutating commands (application-level orchestration).
//!
//! ## `create_invoice` flow
//!
//! ```text
//! service specs
//!   ↓
//! 1. Parse every `name:rate:units` spec       (Validation, nothing touched yet;
//!    totals must fit and rates must survive the journal's JSON numbers)
//!   ↓
//! 2. Look up consultant + client              (ClientNotFound, nothing touched yet)
//!   ↓
//! 3. Mint a number: counter.advance()
//!   ↓
//! 4. Render + write the artifact
//!   ↓
//! 5. Append the journal entry
//! ```
//!
//! Steps 3-5 are not transactional. A failure after step 3 leaves a consumed
//! number and possibly an artifact without a journal entry; `regenerate`
//! rebuilds a consistent state from the journal.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use invoicer_core::DomainError;
use invoicer_invoicing::{
    DirectoryError, Invoice, InvoiceNumber, JournalEntry, PartyDirectory, ServiceLine,
};

use crate::journal_store::{JournalError, JournalStore};
use crate::output::OutputError;
use crate::publish::{PublishError, Publisher};
use crate::regeneration::{
    IssuedInvoice, RegenerationEngine, RegenerationError, RegenerationReport,
};
use crate::sequencer::{NumberSequencer, SequencerError};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed input (service spec, currency, date). Nothing was changed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error("output directory: {0}")]
    Output(#[from] OutputError),

    /// Number `number` was consumed but no journal entry was written.
    #[error("invoice {number}: {source}")]
    Publish {
        number: InvoiceNumber,
        #[source]
        source: PublishError,
    },

    #[error("regeneration failed: {0}")]
    Regeneration(#[from] RegenerationError),
}

/// Outcome of [`CommandDispatcher::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub backup: Option<PathBuf>,
    pub removed: usize,
}

/// Runs the commands that change the journal, the counter or the output
/// directory.
///
/// Generic over the stores so tests run against in-memory implementations.
pub struct CommandDispatcher<J, N, D> {
    journal: J,
    sequencer: N,
    parties: D,
    publisher: Publisher,
}

impl<J, N, D> CommandDispatcher<J, N, D>
where
    J: JournalStore,
    N: NumberSequencer,
    D: PartyDirectory,
{
    pub fn new(journal: J, sequencer: N, parties: D, publisher: Publisher) -> Self {
        Self {
            journal,
            sequencer,
            parties,
            publisher,
        }
    }

    pub fn journal(&self) -> &J {
        &self.journal
    }

    pub fn sequencer(&self) -> &N {
        &self.sequencer
    }

    /// Issue a new invoice for `client_alias` dated `date`.
    ///
    /// `specs` are `name:rate:units` strings; at least one is required.
    pub fn create_invoice<S: AsRef<str>>(
        &self,
        client_alias: &str,
        specs: &[S],
        date: NaiveDate,
    ) -> Result<IssuedInvoice, DispatchError> {
        if specs.is_empty() {
            return Err(DomainError::validation("an invoice needs at least one service").into());
        }
        let services = specs
            .iter()
            .map(|spec| spec.as_ref().parse::<ServiceLine>())
            .collect::<Result<Vec<_>, _>>()?;
        let entry = JournalEntry::new(client_alias, date, services);
        let total = entry.total()?;
        ensure_recordable(&entry)?;

        let consultant = self.parties.consultant()?;
        let client = self.parties.client(client_alias)?;

        let sequence = self.sequencer.advance()?;
        let invoice = Invoice::issue(&client, &entry, sequence);

        let artifact = self
            .publisher
            .publish(&consultant, &client, &invoice)
            .map_err(|source| DispatchError::Publish {
                number: invoice.number.clone(),
                source,
            })?;
        self.journal.append(entry)?;

        tracing::info!(
            client = client_alias,
            number = %invoice.number,
            %total,
            "invoice created"
        );
        Ok(IssuedInvoice {
            total,
            number: invoice.number,
            artifact,
        })
    }

    /// Rebuild every artifact from the journal. See [`RegenerationEngine`].
    pub fn regenerate(&self, now: NaiveDateTime) -> Result<RegenerationReport, DispatchError> {
        let journal = self.journal.load()?;
        let report = RegenerationEngine::new(&self.sequencer, &self.parties, &self.publisher)
            .run(&journal, now)?;
        Ok(report)
    }

    /// Back up and clear the output directory, then reset the counter to 1.
    /// The journal is kept.
    pub fn reset(&self, now: NaiveDateTime) -> Result<ResetReport, DispatchError> {
        let output = self.publisher.output();
        let backup = output.backup(now)?;
        let removed = output.clear()?;
        self.sequencer.reset()?;

        tracing::info!(removed, "invoice output and counter reset");
        Ok(ResetReport { backup, removed })
    }
}

/// Rates are persisted as JSON numbers. Refuse a rate the journal would store
/// with less precision, otherwise regeneration would render a different
/// amount than the artifact issued now.
fn ensure_recordable(entry: &JournalEntry) -> Result<(), DomainError> {
    let recorded: JournalEntry = serde_json::to_value(entry)
        .and_then(serde_json::from_value)
        .map_err(|e| DomainError::validation(format!("entry cannot be recorded: {e}")))?;

    for (line, kept) in entry.services.iter().zip(&recorded.services) {
        if line.rate != kept.rate {
            return Err(DomainError::validation(format!(
                "service {:?}: rate {} cannot be recorded exactly (it would be stored as {})",
                line.name, line.rate, kept.rate
            )));
        }
    }
    Ok(())
}

impl<J, N, D> core::fmt::Debug for CommandDispatcher<J, N, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("publisher", &self.publisher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal::Decimal;

    use invoicer_invoicing::{Client, Consultant};

    use crate::artifact::HtmlWriter;
    use crate::journal_store::InMemoryJournal;
    use crate::output::OutputDirectory;
    use crate::parties::InMemoryPartyDirectory;
    use crate::render::HtmlRenderer;
    use crate::sequencer::InMemorySequencer;

    fn parties() -> InMemoryPartyDirectory {
        InMemoryPartyDirectory::new(Consultant {
            name: "Jane Doe".into(),
            address: "12 rue de la Paix".into(),
            city_postal_code: "75002 Paris".into(),
            country: "France".into(),
            phone_number: "33612345678".into(),
            email: "jane@example.com".into(),
            siret_number: "12345678900011".into(),
            ape_code: "6202A".into(),
            vat_number: "FR00123456789".into(),
            bank_name: "Banque".into(),
            bank_account_number: "FR7612345".into(),
            bank_routing_number: "BNPAFRPP".into(),
        })
        .with_client(Client {
            full_name: "Acme Corporation".into(),
            short_name: "ACME".into(),
            alias: "acme".into(),
            address: "1 Road Runner Way".into(),
            city_state_zip_code: "Phoenix, AZ 85001".into(),
            country: "USA".into(),
        })
    }

    fn dispatcher(
        dir: &tempfile::TempDir,
        counter: u64,
    ) -> CommandDispatcher<InMemoryJournal, InMemorySequencer, InMemoryPartyDirectory> {
        CommandDispatcher::new(
            InMemoryJournal::new(),
            InMemorySequencer::starting_at(counter),
            parties(),
            Publisher::new(
                OutputDirectory::new(dir.path().join("invoices"), dir.path().join("backup")),
                HtmlRenderer::builtin(),
                HtmlWriter,
            ),
        )
    }

    fn feb_10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 2, 10).unwrap()
    }

    #[test]
    fn create_invoice_mints_number_and_appends_entry() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, 7);

        let issued = dispatcher
            .create_invoice("acme", &["Audit:500:1", "Review:200.5:2"], feb_10())
            .unwrap();

        assert_eq!(issued.number.to_string(), "ACME-2023-02-10-7");
        assert_eq!(issued.total, Decimal::new(901, 0));
        assert!(issued.artifact.ends_with("invoice_ACME-2023-02-10-7.html"));
        assert_eq!(dispatcher.sequencer().current().unwrap(), 8);

        let journal = dispatcher.journal().load().unwrap();
        assert_eq!(journal.len(), 1);
        assert_eq!(journal.entries()[0].client_alias, "acme");
        assert_eq!(journal.entries()[0].services[1].units, 2);
    }

    #[test]
    fn rejected_input_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, 7);

        let err = dispatcher
            .create_invoice("acme", &["Audit:500:1", "Broken:abc:1"], feb_10())
            .unwrap_err();
        assert!(matches!(err, DispatchError::Domain(DomainError::Validation(_))));

        let err = dispatcher
            .create_invoice("initech", &["Audit:500:1"], feb_10())
            .unwrap_err();
        assert!(matches!(err, DispatchError::Directory(DirectoryError::ClientNotFound(_))));

        let none: [&str; 0] = [];
        let err = dispatcher.create_invoice("acme", &none, feb_10()).unwrap_err();
        assert!(matches!(err, DispatchError::Domain(_)));

        assert_eq!(dispatcher.sequencer().current().unwrap(), 7);
        assert!(dispatcher.journal().load().unwrap().is_empty());
        assert!(!dir.path().join("invoices").exists());
    }

    #[test]
    fn out_of_range_amounts_are_rejected_before_minting() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, 7);

        let err = dispatcher
            .create_invoice("acme", &["Audit:79228162514264337593543950335:2"], feb_10())
            .unwrap_err();
        assert!(matches!(err, DispatchError::Domain(DomainError::Validation(_))));

        let err = dispatcher
            .create_invoice(
                "acme",
                &["Audit:79228162514264337593543950335:1", "Review:1:1"],
                feb_10(),
            )
            .unwrap_err();
        assert!(matches!(err, DispatchError::Domain(DomainError::Validation(_))));

        assert_eq!(dispatcher.sequencer().current().unwrap(), 7);
        assert!(dispatcher.journal().load().unwrap().is_empty());
        assert!(!dir.path().join("invoices").exists());
    }

    #[test]
    fn rates_the_journal_cannot_hold_exactly_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, 7);

        let err = dispatcher
            .create_invoice("acme", &["Audit:0.123456789012345678:1"], feb_10())
            .unwrap_err();
        assert!(
            matches!(&err, DispatchError::Domain(DomainError::Validation(msg)) if msg.contains("recorded exactly")),
            "{err:?}"
        );
        assert_eq!(dispatcher.sequencer().current().unwrap(), 7);

        let issued = dispatcher
            .create_invoice("acme", &["Hosting:19.99:3"], feb_10())
            .unwrap();
        assert_eq!(issued.total, Decimal::new(5997, 2));
        let journal = dispatcher.journal().load().unwrap();
        assert_eq!(journal.entries()[0].services[0].rate, Decimal::new(1999, 2));
    }

    #[test]
    fn reset_clears_output_and_restarts_counter() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = dispatcher(&dir, 7);
        dispatcher
            .create_invoice("acme", &["Audit:500:1"], feb_10())
            .unwrap();

        let now = feb_10().and_hms_opt(12, 0, 0).unwrap();
        let report = dispatcher.reset(now).unwrap();

        assert_eq!(report.removed, 1);
        let backup = report.backup.unwrap();
        assert!(backup.ends_with("backup_20230210_120000.zip"));
        assert_eq!(dispatcher.sequencer().current().unwrap(), 1);
        assert_eq!(dispatcher.journal().load().unwrap().len(), 1);
    }
}
