//! Monetary value helpers
//!
//! All monetary accumulation uses `rust_decimal::Decimal`. Totals cross the
//! system boundary as decimal strings; binary floats never hold money.

use crate::{SendaiResult, ValidationError};
use rust_decimal::Decimal;

/// Coerce an optional stored amount to a summable value. Null columns count
/// as zero in every aggregate path.
pub fn amount_or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO)
}

/// Parse a decimal string from the boundary, rejecting malformed input.
pub fn parse_amount(field: &'static str, raw: &str) -> SendaiResult<Decimal> {
    Decimal::from_str_exact(raw.trim()).map_err(|e| {
        ValidationError::InvalidValue {
            field: field.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Render an amount as its canonical boundary string.
pub fn format_amount(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_or_zero() {
        assert_eq!(amount_or_zero(None), Decimal::ZERO);
        assert_eq!(
            amount_or_zero(Some(Decimal::new(12345, 2))),
            Decimal::new(12345, 2)
        );
    }

    #[test]
    fn test_parse_amount_exact() {
        let parsed = parse_amount("damage_cost", "500.25").unwrap();
        assert_eq!(parsed, Decimal::new(50025, 2));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        let err = parse_amount("damage_cost", "five hundred");
        assert!(err.is_err());
    }

    #[test]
    fn test_format_amount_normalizes_trailing_zeroes() {
        assert_eq!(format_amount(Decimal::from_str_exact("300.00").unwrap()), "300");
        assert_eq!(format_amount(Decimal::ZERO), "0");
    }

    #[test]
    fn test_decimal_accumulation_has_no_drift() {
        // 0.1 added ten times is exactly 1 in decimal arithmetic.
        let step = Decimal::from_str_exact("0.1").unwrap();
        let mut total = Decimal::ZERO;
        for _ in 0..10 {
            total += step;
        }
        assert_eq!(format_amount(total), "1");
    }

    proptest::proptest! {
        #[test]
        fn prop_format_then_parse_round_trips(mantissa in -1_000_000_000i64..1_000_000_000, scale in 0u32..10) {
            let amount = Decimal::new(mantissa, scale);
            let parsed = parse_amount("amount", &format_amount(amount)).unwrap();
            proptest::prop_assert_eq!(parsed, amount.normalize());
        }
    }
}
