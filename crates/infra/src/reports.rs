//! Read-only reports over the journal.

use chrono::NaiveDate;
use thiserror::Error;

use invoicer_accounting::{
    ConversionError, CurrencyConverter, HistorySummary, IncomeQuery, IncomeReport, RateProvider,
};
use invoicer_core::CurrencyCode;

use crate::journal_store::{JournalError, JournalStore};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Income and history reports. Needs neither party configuration nor the
/// invoice counter.
#[derive(Debug)]
pub struct ReportService<J, P> {
    journal: J,
    converter: CurrencyConverter<P>,
}

impl<J, P> ReportService<J, P>
where
    J: JournalStore,
    P: RateProvider,
{
    pub fn new(journal: J, converter: CurrencyConverter<P>) -> Self {
        Self { journal, converter }
    }

    pub fn base_currency(&self) -> &CurrencyCode {
        self.converter.base()
    }

    pub fn compute_income(
        &self,
        query: &IncomeQuery,
        today: NaiveDate,
    ) -> Result<IncomeReport, ReportError> {
        let journal = self.journal.load()?;
        Ok(invoicer_accounting::compute_income(
            &journal,
            query,
            &self.converter,
            today,
        )?)
    }

    pub fn summarize_history(
        &self,
        currency: Option<&CurrencyCode>,
    ) -> Result<HistorySummary, ReportError> {
        let journal = self.journal.load()?;
        Ok(invoicer_accounting::summarize_history(
            &journal,
            currency,
            &self.converter,
        )?)
    }
}
