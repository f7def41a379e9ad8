//! # smartpos-core: Pure Business Logic for Smart POS
//!
//! This crate holds every rule of the point-of-sale backend that can be
//! expressed without touching a database, a socket or the clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Smart POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    apps/api (axum)                              │    │
//! │  │    /login  /stock  /categories  /customers  /vouchers           │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    smartpos-db                                  │    │
//! │  │    repositories, BatchCoordinator, audit worker                 │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ smartpos-core (THIS CRATE) ★                    │    │
//! │  │                                                                 │    │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐   │    │
//! │  │   │  money  │ │ pricing │ │ voucher │ │  batch  │ │  audit  │   │    │
//! │  │   │  Money  │ │ windows │ │ totals  │ │ demand  │ │snapshots│   │    │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘   │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records and request/response DTOs
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - Time-bounded discounts and effective prices
//! - [`voucher`] - Voucher totals assembly
//! - [`batch`] - Consolidated per-product demand across a batch
//! - [`validation`] - Input validation rules
//! - [`audit`] - Audit actions and snapshot value objects
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use smartpos_core::money::Money;
//! use smartpos_core::voucher::{assemble, PricedLine};
//!
//! let lines = vec![PricedLine::new(1, 3, Money::from_cents(299))];
//! let totals = assemble(&lines, 1000, Money::from_cents(50));
//!
//! // 897 - round(89.7) - 50
//! assert_eq!(totals.final_amount.cents(), 757);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod batch;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;
pub mod voucher;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line in a voucher request.
///
/// Catches typing 1000 instead of 10 at the till.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest unit or cost price a product may carry, in cents.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Largest fixed discount a voucher request may carry, in cents.
pub const MAX_DISCOUNT_CENTS: i64 = 1_000_000_000_000;

/// Maximum lines in a single voucher request.
pub const MAX_VOUCHER_LINES: usize = 100;

/// Maximum vouchers submitted together in one batch.
///
/// A batch holds the database write lock for its whole duration, so its
/// size is capped.
pub const MAX_BATCH_VOUCHERS: usize = 50;

/// Minimum length of a customer search term.
pub const MIN_SEARCH_LEN: usize = 2;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 200;
