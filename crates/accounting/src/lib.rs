//! Reporting over the history journal.
//!
//! Pure computations only: exchange rates come in through the [`RateProvider`]
//! trait, and "today" is always passed in by the caller.

pub mod conversion;
pub mod income;
pub mod summary;

pub use conversion::{ConversionError, CurrencyConverter, RateProvider};
pub use income::{IncomeQuery, IncomeReport, compute_income};
pub use summary::{HistorySummary, Quarter, YearSummary, summarize_history};
