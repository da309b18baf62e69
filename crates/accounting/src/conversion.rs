//! Base-currency to target-currency conversion at historical rates.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use invoicer_core::{CurrencyCode, DomainError};

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("rate service unavailable: {0}")]
    RateServiceUnavailable(String),

    #[error("currency {0} is not supported by the rate service")]
    UnsupportedCurrency(CurrencyCode),

    /// An amount or sum does not fit in a `Decimal`.
    #[error(transparent)]
    Amount(#[from] DomainError),
}

/// Source of historical exchange rates.
///
/// Implementations return the rates from `base` published on `on`; the map may
/// contain more currencies than `target`, or lack it entirely.
pub trait RateProvider {
    fn rates(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        on: NaiveDate,
    ) -> Result<BTreeMap<CurrencyCode, Decimal>, ConversionError>;
}

impl<P> RateProvider for &P
where
    P: RateProvider + ?Sized,
{
    fn rates(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        on: NaiveDate,
    ) -> Result<BTreeMap<CurrencyCode, Decimal>, ConversionError> {
        (**self).rates(base, target, on)
    }
}

impl<P> RateProvider for Box<P>
where
    P: RateProvider + ?Sized,
{
    fn rates(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        on: NaiveDate,
    ) -> Result<BTreeMap<CurrencyCode, Decimal>, ConversionError> {
        (**self).rates(base, target, on)
    }
}

/// Converts amounts out of the base currency.
///
/// No caching: every non-trivial conversion is one provider round-trip.
#[derive(Debug, Clone)]
pub struct CurrencyConverter<P> {
    base: CurrencyCode,
    provider: P,
}

impl<P: RateProvider> CurrencyConverter<P> {
    pub fn new(base: CurrencyCode, provider: P) -> Self {
        Self { base, provider }
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Convert `amount` (in the base currency) into `target` at the rate of `as_of`.
    ///
    /// Converting into the base currency returns `amount` without asking the
    /// provider.
    pub fn convert(
        &self,
        amount: Decimal,
        target: &CurrencyCode,
        as_of: NaiveDate,
    ) -> Result<Decimal, ConversionError> {
        if *target == self.base {
            return Ok(amount);
        }

        let rates = self.provider.rates(&self.base, target, as_of)?;
        let rate = rates
            .get(target)
            .ok_or_else(|| ConversionError::UnsupportedCurrency(target.clone()))?;

        tracing::debug!(%target, %as_of, %rate, "converted amount");
        amount.checked_mul(*rate).ok_or_else(|| {
            DomainError::invariant(format!(
                "{amount} converted to {target} at {rate} is out of range"
            ))
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use proptest::prelude::*;

    /// Provider that counts calls and quotes a fixed set of rates.
    #[derive(Default)]
    struct CountingRates {
        calls: Cell<usize>,
        quotes: BTreeMap<CurrencyCode, Decimal>,
    }

    impl CountingRates {
        fn quoting(code: &str, rate: Decimal) -> Self {
            Self {
                calls: Cell::new(0),
                quotes: BTreeMap::from([(CurrencyCode::new(code).unwrap(), rate)]),
            }
        }
    }

    impl RateProvider for CountingRates {
        fn rates(
            &self,
            _base: &CurrencyCode,
            _target: &CurrencyCode,
            _on: NaiveDate,
        ) -> Result<BTreeMap<CurrencyCode, Decimal>, ConversionError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.quotes.clone())
        }
    }

    struct Down;

    impl RateProvider for Down {
        fn rates(
            &self,
            _base: &CurrencyCode,
            _target: &CurrencyCode,
            _on: NaiveDate,
        ) -> Result<BTreeMap<CurrencyCode, Decimal>, ConversionError> {
            Err(ConversionError::RateServiceUnavailable("HTTP 503".to_string()))
        }
    }

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 2, 10).unwrap()
    }

    #[test]
    fn converts_with_the_quoted_rate() {
        let converter = CurrencyConverter::new(usd(), CountingRates::quoting("EUR", Decimal::new(93, 2)));
        let eur = CurrencyCode::new("EUR").unwrap();

        let converted = converter.convert(Decimal::from(1000), &eur, day()).unwrap();

        assert_eq!(converted, Decimal::from(930));
        assert_eq!(converter.provider.calls.get(), 1);
    }

    #[test]
    fn missing_currency_is_unsupported() {
        let converter = CurrencyConverter::new(usd(), CountingRates::quoting("EUR", Decimal::ONE));
        let xyz = CurrencyCode::new("XYZ").unwrap();

        let err = converter.convert(Decimal::ONE, &xyz, day()).unwrap_err();

        assert!(matches!(err, ConversionError::UnsupportedCurrency(code) if code == xyz));
    }

    #[test]
    fn provider_failure_surfaces() {
        let converter = CurrencyConverter::new(usd(), Down);
        let eur = CurrencyCode::new("EUR").unwrap();

        let err = converter.convert(Decimal::ONE, &eur, day()).unwrap_err();

        assert!(matches!(err, ConversionError::RateServiceUnavailable(msg) if msg.contains("503")));
    }

    #[test]
    fn overflowing_conversion_is_an_error() {
        let converter = CurrencyConverter::new(usd(), CountingRates::quoting("EUR", Decimal::TWO));
        let eur = CurrencyCode::new("EUR").unwrap();

        let err = converter.convert(Decimal::MAX, &eur, day()).unwrap_err();

        assert!(matches!(err, ConversionError::Amount(DomainError::InvariantViolation(_))));
    }

    proptest! {
        /// Property: converting into the base currency is the identity and
        /// never reaches the provider.
        #[test]
        fn base_currency_never_calls_the_provider(
            cents in -1_000_000_000i64..1_000_000_000i64,
            offset in 0i64..20_000,
        ) {
            let converter = CurrencyConverter::new(usd(), CountingRates::default());
            let amount = Decimal::new(cents, 2);
            let date = NaiveDate::default() + chrono::Duration::days(offset);

            let converted = converter.convert(amount, &usd(), date).unwrap();

            prop_assert_eq!(converted, amount);
            prop_assert_eq!(converter.provider.calls.get(), 0);
        }
    }
}
