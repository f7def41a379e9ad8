//! # Voucher Assembler
//!
//! Turns priced lines plus voucher-level discounts into header totals.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► Σ quantity × unit_price ─────────────────────► subtotal      │
//! │                                                              │          │
//! │  discount_percentage_bps ──► round(subtotal × bps) ──┐       │          │
//! │  discount_amount ────────────────────────────────────┴─► total_discount │
//! │                                                              │          │
//! │                    max(0, subtotal − total_discount) ◄───────┘          │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                             final_amount                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `total_discount` is stored as requested even when it exceeds the
//! subtotal; only `final_amount` is clamped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::effective_price;
use crate::types::Product;

/// One voucher line with its unit price resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricedLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl PricedLine {
    pub fn new(product_id: i64, quantity: i64, unit_price: Money) -> Self {
        PricedLine {
            product_id,
            quantity,
            unit_price,
            subtotal: unit_price.multiply_quantity(quantity),
        }
    }

    /// Prices `quantity` units of `product` at `at`.
    pub fn for_product(product: &Product, quantity: i64, at: DateTime<Utc>) -> Self {
        PricedLine::new(product.id, quantity, effective_price(product, at))
    }
}

/// Header amounts of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoucherTotals {
    pub subtotal: Money,
    pub total_discount: Money,
    pub final_amount: Money,
}

/// Computes voucher totals.
///
/// Pass `0` and `Money::zero()` for unset discounts.
pub fn assemble(lines: &[PricedLine], discount_percentage_bps: u32, discount_amount: Money) -> VoucherTotals {
    let subtotal: Money = lines.iter().map(|line| line.subtotal).sum();
    let total_discount = subtotal.percentage_of(discount_percentage_bps) + discount_amount;
    VoucherTotals {
        subtotal,
        total_discount,
        final_amount: (subtotal - total_discount).floor_zero(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i64, cents: i64) -> PricedLine {
        PricedLine::new(product_id, quantity, Money::from_cents(cents))
    }

    #[test]
    fn test_line_subtotal() {
        let l = line(1, 3, 299);
        assert_eq!(l.subtotal.cents(), 897);
    }

    #[test]
    fn test_no_discounts() {
        let totals = assemble(&[line(1, 2, 500), line(2, 1, 250)], 0, Money::zero());
        assert_eq!(totals.subtotal.cents(), 1250);
        assert_eq!(totals.total_discount, Money::zero());
        assert_eq!(totals.final_amount.cents(), 1250);
    }

    #[test]
    fn test_percentage_and_amount_combine() {
        // 10% of 1250 = 125, plus 100 fixed
        let totals = assemble(&[line(1, 2, 500), line(2, 1, 250)], 1000, Money::from_cents(100));
        assert_eq!(totals.total_discount.cents(), 225);
        assert_eq!(totals.final_amount.cents(), 1025);
    }

    #[test]
    fn test_final_amount_clamps_at_zero() {
        let totals = assemble(&[line(1, 1, 500)], 0, Money::from_cents(800));
        assert_eq!(totals.subtotal.cents(), 500);
        assert_eq!(totals.total_discount.cents(), 800);
        assert_eq!(totals.final_amount, Money::zero());
    }

    #[test]
    fn test_extreme_amounts_do_not_wrap() {
        let totals = assemble(&[line(1, 1, 1000)], 1000, Money::from_cents(i64::MAX));
        assert_eq!(totals.subtotal.cents(), 1000);
        assert_eq!(totals.total_discount.cents(), i64::MAX);
        assert_eq!(totals.final_amount, Money::zero());

        let big = line(1, 999, i64::MAX / 2);
        assert_eq!(big.subtotal.cents(), i64::MAX);
        let totals = assemble(&[big, big], 0, Money::zero());
        assert_eq!(totals.final_amount.cents(), i64::MAX);
    }

    #[test]
    fn test_empty_lines() {
        let totals = assemble(&[], 5000, Money::zero());
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.final_amount, Money::zero());
    }
}
