//! Currency rounding and display.
//!
//! Aggregates are accumulated as `f64` and only rounded here, when a value
//! leaves the aggregation layer.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, midpoint away from zero. Non-finite input collapses to 0.
pub fn round_money(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|decimal| decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|decimal| decimal.to_f64())
        .unwrap_or(0.0)
}

/// Formats an amount as `$X,XXX.XX`.
pub fn format_currency(value: f64) -> String {
    let rounded = Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if negative {
        format!("$-{grouped}.{cents}")
    } else {
        format!("${grouped}.{cents}")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_currency, round_money};

    #[test]
    fn rounds_half_cents_away_from_zero() {
        assert_eq!(round_money(10.125), 10.13);
        assert_eq!(round_money(-10.125), -10.13);
        assert_eq!(round_money(0.1 + 0.2), 0.3);
        assert_eq!(round_money(f64::NAN), 0.0);
    }

    #[test]
    fn formats_with_thousands_separators() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
    }

    #[test]
    fn negative_amounts_keep_the_sign_after_the_symbol() {
        assert_eq!(format_currency(-1234.0), "$-1,234.00");
    }
}
