//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats a 20% discount on 3 × $0.10 can store 0.24000000000000002  │
//! │  and the voucher header no longer equals the sum of its lines.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    price_cents × bps / 10000, rounded half up, once per step            │
//! │    Every stored amount is an exact integer                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use smartpos_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line = price.multiply_quantity(3); // $32.97
//! assert_eq!(line.cents(), 3297);
//!
//! // 20% off
//! assert_eq!(price.apply_percentage_discount(2000).cents(), 879);
//! ```

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Sub};
use ts_rs::TS;

/// Basis points in one whole (100%).
pub const BPS_SCALE: u32 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate values (subtotal − discount) may dip
///   below zero before clamping
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► effective_price ──► PricedLine.subtotal
///                                                   │
///                                                   ▼
///                    VoucherTotals { subtotal, total_discount, final_amount }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use smartpos_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Clamps negative amounts to zero.
    ///
    /// ## Example
    /// ```rust
    /// use smartpos_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-250).floor_zero(), Money::zero());
    /// assert_eq!(Money::from_cents(250).floor_zero().cents(), 250);
    /// ```
    #[inline]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Returns `bps` basis points of this amount, rounded half up.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use smartpos_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(1000); // $10.00
    /// // 8.25% of $10.00 = $0.825 → $0.83
    /// assert_eq!(subtotal.percentage_of(825).cents(), 83);
    /// ```
    pub fn percentage_of(&self, bps: u32) -> Money {
        let half = (BPS_SCALE / 2) as i128;
        let portion = (self.0 as i128 * bps as i128 + half) / BPS_SCALE as i128;
        Money::from_cents(portion.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use smartpos_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (1000 = 10%)
    ///
    /// ## Example
    /// ```rust
    /// use smartpos_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(10000); // $100.00
    /// let discounted = subtotal.apply_percentage_discount(1000); // 10% off
    /// assert_eq!(discounted.cents(), 9000); // $90.00
    /// ```
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        *self - self.percentage_of(discount_bps)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition and subtraction saturate instead of wrapping, so a huge
/// discount can only push `final_amount` to its zero floor.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        assert_eq!(Money::from_cents(1099).cents(), 1099);
        assert_eq!(Money::default(), Money::zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!((Money::zero() - max - max).cents(), i64::MIN);
        assert_eq!(max.multiply_quantity(2).cents(), i64::MAX);
        assert_eq!(max.percentage_of(BPS_SCALE).cents(), i64::MAX);
    }

    #[test]
    fn test_percentage_of_rounds_half_up() {
        // 8.25% of $10.00 = 82.5 cents → 83
        assert_eq!(Money::from_cents(1000).percentage_of(825).cents(), 83);
        // 20% of $0.99 = 19.8 cents → 20
        assert_eq!(Money::from_cents(99).percentage_of(2000).cents(), 20);
        assert_eq!(Money::from_cents(1234).percentage_of(0).cents(), 0);
        assert_eq!(Money::from_cents(1234).percentage_of(BPS_SCALE).cents(), 1234);
    }

    #[test]
    fn test_percentage_discount() {
        let subtotal = Money::from_cents(10000);
        assert_eq!(subtotal.apply_percentage_discount(1000).cents(), 9000);
        assert_eq!(subtotal.apply_percentage_discount(BPS_SCALE).cents(), 0);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_cents(-1).floor_zero(), Money::zero());
        assert_eq!(Money::from_cents(0).floor_zero(), Money::zero());
        assert_eq!(Money::from_cents(7).floor_zero().cents(), 7);
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_cents(100), Money::from_cents(250), Money::from_cents(5)];
        let total: Money = lines.iter().sum();
        assert_eq!(total.cents(), 355);
        assert_eq!(Vec::<Money>::new().into_iter().sum::<Money>(), Money::zero());
    }
}
