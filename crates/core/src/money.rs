//! Display formatting for amounts.

use rust_decimal::Decimal;

use crate::currency::CurrencyCode;

/// Format an amount with two decimals and thousands separators.
///
/// Base-currency amounts (`currency == None`) render as `$1,234.50`; converted
/// amounts carry their code: `EUR 1,234.50`.
pub fn format_amount(amount: Decimal, currency: Option<&CurrencyCode>) -> String {
    let grouped = group_thousands(amount);
    match currency {
        Some(code) => format!("{code} {grouped}"),
        None => format!("${grouped}"),
    }
}

fn group_thousands(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac_part}")
}
