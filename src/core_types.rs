//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

use rust_decimal::{Decimal, RoundingStrategy};

/// User ID - globally unique, immutable after assignment.
///
/// # Usage:
/// - Primary key for user accounts (`users_tb.user_id`, BIGSERIAL)
/// - Voucher ownership (`assigned_to`, `redeemed_by`)
pub type UserId = i64;

/// Order ID - unique within the system (`orders_tb.order_id`, BIGSERIAL)
pub type OrderId = i64;

/// Round a money amount to 2 decimal places, half away from zero.
///
/// All client-visible amounts (subtotal, discount, total) go through this.
/// Half-away-from-zero is required: banker's rounding would price 0.125 as
/// 0.12 while the storefront displays 0.13.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a major-unit amount to minor units (e.g. 12.34 -> 1234 paise).
///
/// Payment gateways take integer minor units. Amounts are rounded to 2 dp
/// first, so the scaling is exact.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;
    (round2(amount) * Decimal::ONE_HUNDRED).to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(Decimal::from_str("0.125").unwrap()).to_string(), "0.13");
        assert_eq!(round2(Decimal::from_str("0.124").unwrap()).to_string(), "0.12");
        assert_eq!(round2(Decimal::from_str("10").unwrap()).to_string(), "10.00");
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::from_str("12.34").unwrap()), Some(1234));
        assert_eq!(to_minor_units(Decimal::from_str("0.005").unwrap()), Some(1));
        assert_eq!(to_minor_units(Decimal::ZERO), Some(0));
    }
}
