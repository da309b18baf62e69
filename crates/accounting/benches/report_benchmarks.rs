use std::collections::BTreeMap;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use invoicer_accounting::{
    ConversionError, CurrencyConverter, IncomeQuery, RateProvider, compute_income,
    summarize_history,
};
use invoicer_core::CurrencyCode;
use invoicer_invoicing::{HistoryJournal, JournalEntry, ServiceLine};

/// Local rate table so the benchmark measures aggregation, not the network.
struct FixedRates;

impl RateProvider for FixedRates {
    fn rates(
        &self,
        _base: &CurrencyCode,
        target: &CurrencyCode,
        _on: NaiveDate,
    ) -> Result<BTreeMap<CurrencyCode, Decimal>, ConversionError> {
        Ok(BTreeMap::from([(target.clone(), Decimal::new(92, 2))]))
    }
}

fn journal_of(size: usize) -> HistoryJournal {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    HistoryJournal::from_entries(
        (0..size)
            .map(|i| {
                JournalEntry::new(
                    format!("client-{}", i % 7),
                    start + chrono::Duration::days((i % 3650) as i64),
                    vec![
                        ServiceLine::new("Consulting", (i % 40) as u32, Decimal::new(12_500, 2)),
                        ServiceLine::new("Expenses", 1, Decimal::new(4_999, 2)),
                    ],
                )
            })
            .collect(),
    )
}

fn bench_reports(c: &mut Criterion) {
    let converter = CurrencyConverter::new(CurrencyCode::default(), FixedRates);
    let eur = CurrencyCode::new("EUR").unwrap();
    let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();

    let mut group = c.benchmark_group("reports");
    for size in [100usize, 1_000, 10_000] {
        let journal = journal_of(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("compute_income", size), &journal, |b, j| {
            b.iter(|| compute_income(black_box(j), &IncomeQuery::default(), &converter, today))
        });

        group.bench_with_input(BenchmarkId::new("summarize_history_eur", size), &journal, |b, j| {
            b.iter(|| summarize_history(black_box(j), Some(&eur), &converter))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reports);
criterion_main!(benches);
