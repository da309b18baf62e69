//! Income grouped by calendar year and quarter.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use invoicer_core::CurrencyCode;
use invoicer_invoicing::HistoryJournal;

use crate::conversion::{ConversionError, CurrencyConverter, RateProvider};
use crate::income::{add_amount, line_amount};

/// Calendar quarter. Ordered `Q1 < Q2 < Q3 < Q4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// `((month - 1) / 3) + 1`.
    pub fn of(date: NaiveDate) -> Self {
        match date.month0() / 3 {
            0 => Quarter::Q1,
            1 => Quarter::Q2,
            2 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }
}

impl core::fmt::Display for Quarter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };
        f.write_str(label)
    }
}

/// One year's income: quarter buckets plus the year total.
///
/// Invariant: `total == sum of quarters`. Only quarters with at least one
/// journal entry have a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearSummary {
    quarters: BTreeMap<Quarter, Decimal>,
    total: Decimal,
}

impl YearSummary {
    fn add(&mut self, quarter: Quarter, amount: Decimal) -> Result<(), ConversionError> {
        let bucket = add_amount(self.quarter(quarter), amount)?;
        let total = add_amount(self.total, amount)?;
        self.quarters.insert(quarter, bucket);
        self.total = total;
        Ok(())
    }

    /// The quarter's bucket; zero when nothing was billed in it.
    pub fn quarter(&self, quarter: Quarter) -> Decimal {
        self.quarters.get(&quarter).copied().unwrap_or_default()
    }

    /// Non-empty quarters in ascending order.
    pub fn quarters(&self) -> impl Iterator<Item = (Quarter, Decimal)> + '_ {
        self.quarters.iter().map(|(q, amount)| (*q, *amount))
    }

    pub fn total(&self) -> Decimal {
        self.total
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySummary {
    currency: Option<CurrencyCode>,
    years: BTreeMap<i32, YearSummary>,
}

impl HistorySummary {
    pub fn currency(&self) -> Option<&CurrencyCode> {
        self.currency.as_ref()
    }

    pub fn year(&self, year: i32) -> Option<&YearSummary> {
        self.years.get(&year)
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = (i32, &YearSummary)> + '_ {
        self.years.iter().map(|(year, summary)| (*year, summary))
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Group every service line by its entry's year and quarter.
///
/// Conversion follows the same per-line policy as [`crate::compute_income`].
pub fn summarize_history<P: RateProvider>(
    journal: &HistoryJournal,
    currency: Option<&CurrencyCode>,
    converter: &CurrencyConverter<P>,
) -> Result<HistorySummary, ConversionError> {
    let mut years: BTreeMap<i32, YearSummary> = BTreeMap::new();

    for entry in journal.entries() {
        let bucket = years.entry(entry.invoice_date.year()).or_default();
        let quarter = Quarter::of(entry.invoice_date);
        for line in &entry.services {
            bucket.add(quarter, line_amount(entry, line, currency, converter)?)?;
        }
    }

    tracing::info!(years = years.len(), "summarized history");

    Ok(HistorySummary {
        currency: currency.cloned(),
        years,
    })
}
