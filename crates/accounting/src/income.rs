//! Total income over a date range.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use invoicer_core::{CurrencyCode, DomainError};
use invoicer_invoicing::{HistoryJournal, JournalEntry, ServiceLine};

use crate::conversion::{ConversionError, CurrencyConverter, RateProvider};

/// Parameters of an income computation. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomeQuery {
    /// Defaults to 1970-01-01.
    pub start: Option<NaiveDate>,
    /// Defaults to the caller's "today".
    pub end: Option<NaiveDate>,
    /// Report in this currency instead of the base currency.
    pub currency: Option<CurrencyCode>,
}

impl IncomeQuery {
    /// Inclusive `[start, end]` range after applying defaults.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        // NaiveDate's default is the Unix epoch.
        (self.start.unwrap_or_default(), self.end.unwrap_or(today))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub currency: Option<CurrencyCode>,
    /// Number of journal entries inside the range.
    pub entries: usize,
    pub total: Decimal,
}

/// Sum every service line of the entries dated within the query range.
///
/// With a currency, each line total is converted on its own at its entry's
/// date before summing; rates differ per date, so converting the final sum
/// once would report a different figure.
pub fn compute_income<P: RateProvider>(
    journal: &HistoryJournal,
    query: &IncomeQuery,
    converter: &CurrencyConverter<P>,
    today: NaiveDate,
) -> Result<IncomeReport, ConversionError> {
    let (start, end) = query.range(today);

    let mut entries = 0;
    let mut total = Decimal::ZERO;
    for entry in journal.between(start, end) {
        entries += 1;
        for line in &entry.services {
            total = add_amount(total, line_amount(entry, line, query.currency.as_ref(), converter)?)?;
        }
    }

    tracing::info!(%start, %end, entries, %total, "computed income");

    Ok(IncomeReport {
        start,
        end,
        currency: query.currency.clone(),
        entries,
        total,
    })
}

/// A line's total, converted at its entry's date when a currency is requested.
pub(crate) fn line_amount<P: RateProvider>(
    entry: &JournalEntry,
    line: &ServiceLine,
    currency: Option<&CurrencyCode>,
    converter: &CurrencyConverter<P>,
) -> Result<Decimal, ConversionError> {
    let total = line.total()?;
    match currency {
        Some(target) => converter.convert(total, target, entry.invoice_date),
        None => Ok(total),
    }
}

/// `sum + amount`, as an error instead of a panic on overflow.
pub(crate) fn add_amount(sum: Decimal, amount: Decimal) -> Result<Decimal, ConversionError> {
    sum.checked_add(amount).ok_or_else(|| {
        DomainError::invariant(format!("adding {amount} to {sum} is out of range")).into()
    })
}
