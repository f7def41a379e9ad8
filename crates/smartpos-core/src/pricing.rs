//! # Pricing Engine
//!
//! Decides what a product costs at a given instant.
//!
//! ## Discount Window
//! ```text
//!            discount_start                     discount_end
//!                  │                                  │
//!   ───────────────●══════════════════════════════════●───────────────► time
//!      list price  │◄──── price − round(price×bps) ──►│   list price
//!                  │                                  │
//!              inclusive                          inclusive
//! ```
//!
//! An unset bound is open on that side. A zero discount never applies.
//!
//! The caller passes `at`; nothing in here reads the clock. The batch
//! coordinator takes one `now` per batch so every line of every voucher
//! in the batch is priced against the same instant.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::Product;

/// A percentage discount bounded in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountWindow {
    pub percent_bps: u32,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DiscountWindow {
    /// Checks whether the discount applies at `at`. Both bounds are inclusive.
    pub fn is_active(&self, at: DateTime<Utc>) -> bool {
        if self.percent_bps == 0 {
            return false;
        }
        let after_start = self.start.map_or(true, |start| at >= start);
        let before_end = self.end.map_or(true, |end| at <= end);
        after_start && before_end
    }
}

/// Returns the unit price of `product` at `at`.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use smartpos_core::pricing::effective_price;
/// # use smartpos_core::types::Product;
/// # let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// # let product = Product {
/// #     id: 1, name: "tea".into(), description: None, category_id: None,
/// #     price_cents: 1000, cost_price_cents: None, quantity: 1,
/// #     discount_percent_bps: 2000, discount_start: None, discount_end: None,
/// #     arrival_date: at, last_sold_at: None, created_at: at,
/// # };
/// assert_eq!(effective_price(&product, at).cents(), 800);
/// ```
pub fn effective_price(product: &Product, at: DateTime<Utc>) -> Money {
    sale_price(product, at).unwrap_or_else(|| product.price())
}

/// Returns the discounted price when the product is on sale at `at`.
pub fn sale_price(product: &Product, at: DateTime<Utc>) -> Option<Money> {
    let window = product.discount_window();
    if window.is_active(at) {
        Some(product.price().apply_percentage_discount(window.percent_bps))
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
