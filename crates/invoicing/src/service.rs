use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use invoicer_core::{DomainError, DomainResult, ValueObject};

/// One billed service: `units` at `rate` each, in the base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub name: String,
    pub units: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
}

impl ServiceLine {
    pub fn new(name: impl Into<String>, units: u32, rate: Decimal) -> Self {
        Self {
            name: name.into(),
            units,
            rate,
        }
    }

    /// `units x rate`, or a validation error when the product does not fit
    /// in a `Decimal`.
    pub fn total(&self) -> DomainResult<Decimal> {
        Decimal::from(self.units)
            .checked_mul(self.rate)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "service {:?}: {} x {} is out of range",
                    self.name, self.units, self.rate
                ))
            })
    }
}

/// Sum of the line totals, failing instead of overflowing.
pub fn total_of<'a>(lines: impl IntoIterator<Item = &'a ServiceLine>) -> DomainResult<Decimal> {
    lines.into_iter().try_fold(Decimal::ZERO, |sum, line| {
        sum.checked_add(line.total()?)
            .ok_or_else(|| DomainError::validation("sum of service totals is out of range"))
    })
}

impl ValueObject for ServiceLine {}

/// Parses the command-line form `name:rate:units` (note: rate before units).
impl FromStr for ServiceLine {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let [name, rate, units] = fields.as_slice() else {
            return Err(DomainError::validation(format!(
                "service {s:?} must have the form name:rate:units ({} field(s) found)",
                fields.len()
            )));
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation(format!(
                "service {s:?} has an empty name"
            )));
        }

        let rate = Decimal::from_str(rate.trim()).map_err(|e| {
            DomainError::validation(format!("service {s:?} has a non-numeric rate: {e}"))
        })?;
        let units = units.trim().parse::<u32>().map_err(|e| {
            DomainError::validation(format!("service {s:?} has invalid units: {e}"))
        })?;

        let line = Self::new(name, units, rate);
        line.total()?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_rate_units() {
        let line: ServiceLine = "Security audit:5000:1".parse().unwrap();
        assert_eq!(line.name, "Security audit");
        assert_eq!(line.rate, Decimal::from(5000));
        assert_eq!(line.units, 1);
        assert_eq!(line.total().unwrap(), Decimal::from(5000));
    }

    #[test]
    fn fractional_rates_are_exact() {
        let line: ServiceLine = "Hosting:19.99:3".parse().unwrap();
        assert_eq!(line.total().unwrap(), Decimal::new(5997, 2));
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        for bad in ["Audit", "Audit:500", "Audit:500:1:extra", "a:b:c:d"] {
            let err = bad.parse::<ServiceLine>().unwrap_err();
            assert!(
                matches!(&err, DomainError::Validation(msg) if msg.contains("name:rate:units")),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn non_numeric_rate_or_units_are_rejected() {
        let err = "Audit:lots:1".parse::<ServiceLine>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("rate")));

        let err = "Audit:500:one".parse::<ServiceLine>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("units")));

        assert!("Audit:500:-1".parse::<ServiceLine>().is_err());
        assert!(":500:1".parse::<ServiceLine>().is_err());
    }

    #[test]
    fn totals_that_overflow_are_rejected() {
        let err = "Audit:79228162514264337593543950335:2"
            .parse::<ServiceLine>()
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("out of range")));

        let line = ServiceLine::new("Audit", 1, Decimal::MAX);
        assert_eq!(line.total().unwrap(), Decimal::MAX);
        assert!(total_of([&line, &line]).is_err());
    }

    #[test]
    fn rate_is_stored_as_a_json_number() {
        let line = ServiceLine::new("Audit", 10, Decimal::new(5000, 1));
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["rate"], serde_json::json!(500.0));
        assert_eq!(json["units"], serde_json::json!(10));

        let back: ServiceLine =
            serde_json::from_str(r#"{"name":"Audit","units":10,"rate":500}"#).unwrap();
        assert_eq!(back.total().unwrap(), Decimal::from(5000));
    }
}
