//! Wires [`Settings`] into the dispatcher and report service and prints
//! results.

use std::io::Write;

use anyhow::Context;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use invoicer_accounting::{CurrencyConverter, IncomeQuery};
use invoicer_core::format_amount;
use invoicer_infra::artifact::{HtmlWriter, PdfWriter};
use invoicer_infra::journal_store::FileJournal;
use invoicer_infra::output::OutputDirectory;
use invoicer_infra::parties::YamlPartyDirectory;
use invoicer_infra::publish::Publisher;
use invoicer_infra::rates::FrankfurterRates;
use invoicer_infra::render::HtmlRenderer;
use invoicer_infra::sequencer::FileSequencer;
use invoicer_infra::{ArtifactFormat, CommandDispatcher, ReportService, Settings};

use crate::args::Command;

const RULE: &str = "------------------------------";

type FileDispatcher = CommandDispatcher<FileJournal, FileSequencer, YamlPartyDirectory>;

pub fn dispatcher(settings: &Settings) -> anyhow::Result<FileDispatcher> {
    let output = OutputDirectory::new(settings.output_dir(), settings.backup_dir());
    let renderer = HtmlRenderer::load(&settings.templates_dir())?;
    let publisher = match settings.artifact_format {
        ArtifactFormat::Pdf => {
            Publisher::new(output, renderer, PdfWriter::new(&settings.wkhtmltopdf))
        }
        ArtifactFormat::Html => Publisher::new(output, renderer, HtmlWriter),
    };

    Ok(CommandDispatcher::new(
        FileJournal::new(settings.history_file()),
        FileSequencer::open(settings.counter_file())?,
        YamlPartyDirectory::new(settings.config_dir()),
        publisher,
    ))
}

pub fn reports(settings: &Settings) -> anyhow::Result<ReportService<FileJournal, FrankfurterRates>> {
    let rates = FrankfurterRates::new(settings.rates_url.clone())?;
    Ok(ReportService::new(
        FileJournal::new(settings.history_file()),
        CurrencyConverter::new(settings.base_currency.clone(), rates),
    ))
}

/// Execute `command`, writing human-readable results to `out`.
pub fn run(
    command: Command,
    settings: &Settings,
    out: &mut impl Write,
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    let today = now.date();
    match command {
        Command::CreateInvoice {
            client_alias,
            services,
            date,
        } => {
            let issued = dispatcher(settings)?
                .create_invoice(&client_alias, &services, date.unwrap_or(today))
                .with_context(|| format!("creating invoice for {client_alias:?}"))?;
            writeln!(
                out,
                "Created invoice {} ({}): {}",
                issued.number,
                format_amount(issued.total, None),
                issued.artifact.display()
            )?;
        }
        Command::Regenerate => {
            let report = dispatcher(settings)?
                .regenerate(now)
                .context("regenerating invoices")?;
            if let Some(backup) = &report.backup {
                writeln!(out, "Backed up previous invoices to {}", backup.display())?;
            }
            for issued in &report.issued {
                writeln!(out, "  {}", issued.artifact.display())?;
            }
            writeln!(out, "Regenerated {} invoices", report.issued.len())?;
        }
        Command::Reset => {
            let report = dispatcher(settings)?.reset(now).context("resetting invoices")?;
            if let Some(backup) = &report.backup {
                writeln!(out, "Backed up previous invoices to {}", backup.display())?;
            }
            writeln!(out, "Removed {} invoices, invoice number reset to 1", report.removed)?;
        }
        Command::ComputeIncome {
            start,
            end,
            currency,
        } => {
            let query = IncomeQuery {
                start,
                end,
                currency,
            };
            let report = reports(settings)?
                .compute_income(&query, today)
                .context("computing income")?;
            writeln!(
                out,
                "Total income: {}",
                format_amount(report.total, report.currency.as_ref())
            )?;
        }
        Command::SummarizeHistory { currency } => {
            let summary = reports(settings)?
                .summarize_history(currency.as_ref())
                .context("summarizing history")?;
            let amount = |value: Decimal| format_amount(value, summary.currency());

            writeln!(out, "Summary of the History:")?;
            writeln!(out, "{RULE}")?;
            for (year, totals) in summary.years() {
                writeln!(out, "{year}:")?;
                for (quarter, value) in totals.quarters() {
                    writeln!(out, "  {quarter}: {}", amount(value))?;
                }
                writeln!(out, "  total: {}", amount(totals.total()))?;
            }
            writeln!(out, "{RULE}")?;
        }
    }
    Ok(())
}
