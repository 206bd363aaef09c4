//! Decimal arithmetic utilities for order parameters.

use crate::error::{StrategyError, StrategyResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of planned limit prices.
pub const PRICE_DECIMALS: u32 = 2;

/// Decimal places of planned quantities.
pub const QUANTITY_DECIMALS: u32 = 6;

/// Round a decimal to a specific number of decimal places.
///
/// Midpoints round to the nearest even digit.
pub fn round_to_precision(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven)
}

/// Round a price to [`PRICE_DECIMALS`].
pub fn round_price(value: Decimal) -> Decimal {
    round_to_precision(value, PRICE_DECIMALS)
}

/// Round a quantity to [`QUANTITY_DECIMALS`].
pub fn round_quantity(value: Decimal) -> Decimal {
    round_to_precision(value, QUANTITY_DECIMALS)
}

/// Fail with `InvalidParameters` unless `value > 0`.
pub fn require_positive(name: &str, value: Decimal) -> StrategyResult<()> {
    if value > Decimal::ZERO {
        Ok(())
    } else {
        Err(StrategyError::InvalidParameters(format!(
            "{} must be greater than 0, got {}",
            name, value
        )))
    }
}

/// Fail with `InvalidParameters` unless the integer count is > 0.
pub fn require_positive_count(name: &str, value: u64) -> StrategyResult<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(StrategyError::InvalidParameters(format!(
            "{} must be greater than 0",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(dec!(133.333333)), dec!(133.33));
        assert_eq!(round_price(dec!(100.125)), dec!(100.12));
        assert_eq!(round_price(dec!(100.135)), dec!(100.14));
    }

    #[test]
    fn test_round_quantity() {
        assert_eq!(round_quantity(dec!(1) / dec!(3)), dec!(0.333333));
        assert_eq!(round_quantity(dec!(2) / dec!(3)), dec!(0.666667));
        assert_eq!(round_quantity(dec!(0.25)), dec!(0.25));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("quantity", dec!(0.001)).is_ok());
        assert!(require_positive("quantity", Decimal::ZERO).is_err());

        let err = require_positive("price", dec!(-5)).unwrap_err();
        assert_eq!(
            err,
            StrategyError::InvalidParameters("price must be greater than 0, got -5".into())
        );
    }

    #[test]
    fn test_require_positive_count() {
        assert!(require_positive_count("levels", 1).is_ok());
        assert!(require_positive_count("levels", 0).is_err());
    }
}
