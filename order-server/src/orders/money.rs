//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts live in memory as `Decimal` and in SQLite as INTEGER minor units
//! (scale 2). Every conversion rounds half-up so the stored total and the
//! sum of the stored lines can never drift apart.

use super::OrderError;
use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Round to the currency's minor unit
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Decimal amount → INTEGER minor units
pub fn to_minor(value: Decimal) -> i64 {
    let scaled = round_money(value) * Decimal::from(100);
    scaled.to_i64().unwrap_or_default()
}

/// INTEGER minor units → Decimal amount
pub fn from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, DECIMAL_PLACES)
}

/// quantity × unit price, in minor units
#[inline]
pub fn line_total_minor(quantity: i32, unit_price_minor: i64) -> i64 {
    i64::from(quantity) * unit_price_minor
}

pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

/// Validate a requested quantity (1..=MAX_QUANTITY)
pub fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidQuantity(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_minor_unit_conversion() {
        assert_eq!(to_minor(Decimal::from(50000)), 5_000_000);
        assert_eq!(from_minor(5_000_000), Decimal::from(50000));
        assert_eq!(to_minor(Decimal::from_str("12.345").unwrap()), 1235);
        assert_eq!(to_minor(Decimal::from_str("12.344").unwrap()), 1234);
        assert_eq!(from_minor(1), Decimal::from_str("0.01").unwrap());
    }

    #[test]
    fn test_no_float_drift() {
        // 0.1 + 0.2 style sums stay exact in minor units
        let price = to_minor(Decimal::from_str("0.10").unwrap());
        let total: i64 = (0..3).map(|_| line_total_minor(1, price)).sum();
        assert_eq!(from_minor(total), Decimal::from_str("0.30").unwrap());
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total_minor(5, 5_000_000), 25_000_000);
        assert_eq!(line_total_minor(MAX_QUANTITY, 1), 9999);
    }

    #[test]
    fn test_money_eq() {
        let a = Decimal::from_str("100.00").unwrap();
        let b = Decimal::from_str("100.004").unwrap();
        assert!(money_eq(a, b));
        assert!(!money_eq(a, Decimal::from_str("100.01").unwrap()));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(OrderError::InvalidQuantity(_))
        ));
        assert!(matches!(
            validate_quantity(-3),
            Err(OrderError::InvalidQuantity(_))
        ));
        assert!(matches!(
            validate_quantity(MAX_QUANTITY + 1),
            Err(OrderError::InvalidQuantity(_))
        ));
    }
}
