//! # Price Conversion
//!
//! Q64.64 sqrt prices to human-readable decimal prices.
//!
//! `ui_price = (sqrt_price / 2^64)^2 * 10^(decimals_a - decimals_b)`, the
//! amount of token B one whole token A buys. Sqrt prices are bounded by
//! `MAX_SQRT_PRICE_X64 < 2^96`, so they fit a `Decimal` mantissa.

use rust_decimal::Decimal;

use crate::constants::{MAX_SQRT_PRICE_X64, Q64};
use crate::errors::{PriceError, PriceResult};

/// Largest power of ten a `Decimal` can scale by
const MAX_DECIMAL_SCALE: u32 = 28;

fn pow10(exp: u32) -> PriceResult<Decimal> {
    (0..exp)
        .try_fold(Decimal::ONE, |acc, _| acc.checked_mul(Decimal::TEN))
        .ok_or(PriceError::Overflow)
}

/// Human-readable price of token A in token B
pub fn sqrt_price_to_ui_price(
    sqrt_price_x64: u128,
    decimals_a: u8,
    decimals_b: u8,
) -> PriceResult<Decimal> {
    if sqrt_price_x64 > MAX_SQRT_PRICE_X64 {
        return Err(PriceError::SqrtPriceOutOfRange(sqrt_price_x64));
    }
    let diff = decimals_a as i32 - decimals_b as i32;
    if diff.unsigned_abs() > MAX_DECIMAL_SCALE {
        return Err(PriceError::DecimalsOutOfRange(diff));
    }

    let numerator = Decimal::try_from_i128_with_scale(sqrt_price_x64 as i128, 0)
        .map_err(|_| PriceError::SqrtPriceOutOfRange(sqrt_price_x64))?;
    let denominator =
        Decimal::try_from_i128_with_scale(Q64 as i128, 0).map_err(|_| PriceError::Overflow)?;
    let sqrt = numerator
        .checked_div(denominator)
        .ok_or(PriceError::Overflow)?;
    let price = sqrt.checked_mul(sqrt).ok_or(PriceError::Overflow)?;

    let scale = pow10(diff.unsigned_abs())?;
    let scaled = if diff >= 0 {
        price.checked_mul(scale)
    } else {
        price.checked_div(scale)
    };
    scaled.ok_or(PriceError::Overflow)
}

/// `|before - after| / before * 100`, or `None` when `before` is zero
pub fn price_impact_pct(before: Decimal, after: Decimal) -> Option<Decimal> {
    if before.is_zero() {
        return None;
    }
    (before - after)
        .abs()
        .checked_div(before)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_sqrt_price() {
        assert_eq!(sqrt_price_to_ui_price(Q64, 6, 6).unwrap(), Decimal::ONE);
        assert_eq!(sqrt_price_to_ui_price(Q64 * 2, 6, 6).unwrap(), Decimal::from(4));
    }

    #[test]
    fn test_decimal_adjustment() {
        assert_eq!(sqrt_price_to_ui_price(Q64, 9, 6).unwrap(), Decimal::from(1000));
        assert_eq!(sqrt_price_to_ui_price(Q64, 6, 9).unwrap(), Decimal::new(1, 3));
    }

    #[test]
    fn test_half_sqrt_price() {
        let price = sqrt_price_to_ui_price(Q64 / 2, 6, 6).unwrap();
        assert_eq!(price, Decimal::new(25, 2));
    }

    #[test]
    fn test_out_of_range_inputs() {
        assert_eq!(
            sqrt_price_to_ui_price(MAX_SQRT_PRICE_X64 + 1, 6, 6),
            Err(PriceError::SqrtPriceOutOfRange(MAX_SQRT_PRICE_X64 + 1))
        );
        assert_eq!(
            sqrt_price_to_ui_price(Q64, 40, 0),
            Err(PriceError::DecimalsOutOfRange(40))
        );
    }

    #[test]
    fn test_max_sqrt_price_converts() {
        assert!(sqrt_price_to_ui_price(MAX_SQRT_PRICE_X64, 6, 6).unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_price_impact() {
        let impact = price_impact_pct(Decimal::from(100), Decimal::from(95)).unwrap();
        assert_eq!(impact, Decimal::from(5));
        let impact = price_impact_pct(Decimal::from(100), Decimal::from(110)).unwrap();
        assert_eq!(impact, Decimal::from(10));
        assert_eq!(price_impact_pct(Decimal::ZERO, Decimal::ONE), None);
    }
}
