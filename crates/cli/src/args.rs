use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use invoicer_core::CurrencyCode;

#[derive(Parser, Debug)]
#[command(name = "invoicer", version, about = "Invoice generator and payment tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new invoice
    #[command(name = "create_invoice")]
    CreateInvoice {
        /// Client alias
        client_alias: String,

        /// Services in the format 'name:rate:units'
        #[arg(required = true, num_args = 1..)]
        services: Vec<String>,

        /// Date of the invoice (YYYY-MM-DD, default: today)
        #[arg(short = 'd', long = "date")]
        date: Option<NaiveDate>,
    },

    /// Regenerate every invoice from the history
    Regenerate,

    /// Reset the invoice number and delete all invoices
    Reset,

    /// Compute the income for a given period
    #[command(name = "compute_income")]
    ComputeIncome {
        /// Start of the period (YYYY-MM-DD, default: 1970-01-01)
        #[arg(short = 's', long = "start_date", alias = "start")]
        start: Option<NaiveDate>,

        /// End of the period (YYYY-MM-DD, default: today)
        #[arg(short = 'e', long = "end_date", alias = "end")]
        end: Option<NaiveDate>,

        /// Currency to report in
        #[arg(short = 'c', long = "currency")]
        currency: Option<CurrencyCode>,
    },

    /// Summarize the history per year and quarter
    #[command(name = "summarize_history")]
    SummarizeHistory {
        /// Currency to report in
        #[arg(short = 'c', long = "currency")]
        currency: Option<CurrencyCode>,
    },
}
