//! Cart pricing - the single authoritative implementation
//!
//! Both the server order path and the client cart preview price through this
//! module, so displayed totals can never diverge from what the server charges.
//!
//! ## Coercion policy
//! Malformed numeric input is clamped, not rejected: a negative unit price
//! prices as 0, a quantity below 1 prices as 1. This is a deliberate
//! permissive default for data that already passed the HTTP boundary (which
//! rejects negative numbers outright); it is NOT an error path and nothing
//! is logged for it.
//!
//! ## Discount rules
//! - BOGO: every line expands into `qty` unit-price entries; the single
//!   cheapest unit across the whole cart is free. Order-independent.
//! - PERCENT: `value`% of the subtotal, rounded to 2 dp, capped at subtotal.
//! - AMOUNT: `value` off, capped at subtotal, never below 0.
//! - Unknown/missing kind: 0.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core_types::round2;

/// Voucher discount kind, wire-compatible with the stored `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountKind {
    Bogo,
    Percent,
    Amount,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bogo => "BOGO",
            Self::Percent => "PERCENT",
            Self::Amount => "AMOUNT",
        }
    }

    /// Parse a stored kind. Unknown strings return `None`, which prices to 0.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BOGO" => Some(Self::Bogo),
            "PERCENT" => Some(Self::Percent),
            "AMOUNT" => Some(Self::Amount),
            _ => None,
        }
    }
}

/// A priced cart line: unit price and quantity. All the pricing functions
/// need; richer item types (product id, display name) convert down to this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitLine {
    pub price: Decimal,
    pub qty: i64,
}

impl UnitLine {
    pub fn new(price: Decimal, qty: i64) -> Self {
        Self { price, qty }
    }
}

/// Server-side price breakdown for a cart + optional voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

fn clamp_price(price: Decimal) -> Decimal {
    if price.is_sign_negative() { Decimal::ZERO } else { price }
}

fn clamp_qty(qty: i64) -> i64 {
    qty.max(1)
}

/// Sum of price x qty over all lines, coercion applied, rounded to 2 dp.
pub fn subtotal(lines: &[UnitLine]) -> Decimal {
    let sum = lines
        .iter()
        .map(|l| clamp_price(l.price) * Decimal::from(clamp_qty(l.qty)))
        .sum();
    round2(sum)
}

/// BOGO discount: the cheapest single unit across the expanded cart is free.
///
/// Expanding each line into `qty` copies of its unit price and sorting
/// ascending would pick the head; since every copy of a line shares one
/// price, the min over line prices is the same unit.
fn bogo_discount(lines: &[UnitLine]) -> Decimal {
    lines
        .iter()
        .map(|l| clamp_price(l.price))
        .min()
        .unwrap_or(Decimal::ZERO)
}

/// Compute the discount for a voucher kind/value against a cart.
///
/// Pure and deterministic; the result is always within `[0, subtotal]`.
pub fn discount(kind: Option<DiscountKind>, value: Decimal, lines: &[UnitLine]) -> Decimal {
    let sub = subtotal(lines);
    let raw = match kind {
        Some(DiscountKind::Bogo) => bogo_discount(lines),
        Some(DiscountKind::Percent) => {
            let pct = value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            round2(sub * pct / Decimal::ONE_HUNDRED)
        }
        Some(DiscountKind::Amount) => value.max(Decimal::ZERO),
        None => Decimal::ZERO,
    };
    round2(raw.min(sub))
}

/// Full breakdown: subtotal, discount, `total = max(0, subtotal - discount)`.
pub fn quote(lines: &[UnitLine], voucher: Option<(DiscountKind, Decimal)>) -> Quote {
    let sub = subtotal(lines);
    let disc = match voucher {
        Some((kind, value)) => discount(Some(kind), value, lines),
        None => Decimal::ZERO,
    };
    Quote {
        subtotal: sub,
        discount: disc,
        total: round2((sub - disc).max(Decimal::ZERO)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(price: &str, qty: i64) -> UnitLine {
        UnitLine::new(dec(price), qty)
    }

    #[test]
    fn test_subtotal_basic() {
        let cart = [line("10", 2), line("6", 1)];
        assert_eq!(subtotal(&cart), dec("26.00"));
    }

    #[test]
    fn test_subtotal_empty_cart() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_coerces_negative_price_to_zero() {
        let cart = [line("-5", 3), line("4", 1)];
        assert_eq!(subtotal(&cart), dec("4.00"));
    }

    #[test]
    fn test_subtotal_coerces_zero_qty_to_one() {
        // qty below 1 prices as 1, matching the documented permissive policy
        let cart = [line("7.50", 0), line("7.50", -2)];
        assert_eq!(subtotal(&cart), dec("15.00"));
    }

    #[test]
    fn test_bogo_frees_cheapest_unit_across_lines() {
        // units [10, 10, 6] -> cheapest unit is 6
        let cart = [line("10", 2), line("6", 1)];
        let d = discount(Some(DiscountKind::Bogo), Decimal::ZERO, &cart);
        assert_eq!(d, dec("6.00"));
    }

    #[test]
    fn test_bogo_is_order_independent() {
        let a = [line("6", 1), line("10", 2)];
        let b = [line("10", 2), line("6", 1)];
        assert_eq!(
            discount(Some(DiscountKind::Bogo), Decimal::ZERO, &a),
            discount(Some(DiscountKind::Bogo), Decimal::ZERO, &b),
        );
    }

    #[test]
    fn test_bogo_empty_cart_is_zero() {
        assert_eq!(discount(Some(DiscountKind::Bogo), Decimal::ZERO, &[]), Decimal::ZERO);
    }

    #[test]
    fn test_bogo_single_unit_makes_cart_free() {
        let cart = [line("12.50", 1)];
        let q = quote(&cart, Some((DiscountKind::Bogo, Decimal::ZERO)));
        assert_eq!(q.discount, dec("12.50"));
        assert_eq!(q.total, dec("0.00"));
    }

    #[test]
    fn test_percent_twenty_on_fifty() {
        let cart = [line("50.00", 1)];
        let q = quote(&cart, Some((DiscountKind::Percent, dec("20"))));
        assert_eq!(q.discount, dec("10.00"));
        assert_eq!(q.total, dec("40.00"));
    }

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        // 15% of 33.33 = 4.9995 -> 5.00 (half away from zero)
        let cart = [line("33.33", 1)];
        let d = discount(Some(DiscountKind::Percent), dec("15"), &cart);
        assert_eq!(d, dec("5.00"));
    }

    #[test]
    fn test_percent_over_hundred_caps_at_subtotal() {
        let cart = [line("50.00", 1)];
        let d = discount(Some(DiscountKind::Percent), dec("250"), &cart);
        assert_eq!(d, dec("50.00"));
    }

    #[test]
    fn test_percent_negative_value_is_zero() {
        let cart = [line("50.00", 1)];
        assert_eq!(discount(Some(DiscountKind::Percent), dec("-20"), &cart), Decimal::ZERO);
    }

    #[test]
    fn test_amount_caps_at_subtotal() {
        let cart = [line("60.00", 1)];
        let q = quote(&cart, Some((DiscountKind::Amount, dec("100"))));
        assert_eq!(q.discount, dec("60.00"));
        assert_eq!(q.total, dec("0.00"));
    }

    #[test]
    fn test_amount_negative_value_is_zero() {
        let cart = [line("60.00", 1)];
        let q = quote(&cart, Some((DiscountKind::Amount, dec("-40"))));
        assert_eq!(q.discount, Decimal::ZERO);
        assert_eq!(q.total, dec("60.00"));
    }

    #[test]
    fn test_missing_kind_prices_to_zero() {
        let cart = [line("30", 2)];
        assert_eq!(discount(None, dec("50"), &cart), Decimal::ZERO);
    }

    #[test]
    fn test_unknown_stored_kind_parses_to_none() {
        assert_eq!(DiscountKind::parse("FLASH_SALE"), None);
        assert_eq!(DiscountKind::parse("BOGO"), Some(DiscountKind::Bogo));
    }

    #[test]
    fn test_invariant_discount_never_exceeds_subtotal() {
        let carts: &[&[UnitLine]] = &[
            &[],
            &[line("10", 2), line("6", 1)],
            &[line("0.01", 1)],
            &[line("-3", 5), line("2", 0)],
        ];
        let vouchers = [
            (DiscountKind::Bogo, dec("0")),
            (DiscountKind::Percent, dec("99")),
            (DiscountKind::Percent, dec("1000")),
            (DiscountKind::Amount, dec("100000")),
            (DiscountKind::Amount, dec("-5")),
        ];
        for cart in carts {
            for (kind, value) in vouchers {
                let q = quote(cart, Some((kind, value)));
                assert!(q.discount <= q.subtotal, "{kind:?} {value} on {cart:?}");
                assert!(q.total >= Decimal::ZERO, "{kind:?} {value} on {cart:?}");
                assert!(q.total <= q.subtotal, "{kind:?} {value} on {cart:?}");
            }
        }
    }
}
