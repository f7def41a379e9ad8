//! # Error Types
//!
//! Domain-specific error types for smartpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  smartpos-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  smartpos-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── CheckoutError    - CoreError | DbError from the coordinator        │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                 │
//! │  └── ApiError         - { code, message } JSON body                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more referenced products do not exist.
    ///
    /// Carries every missing id, not just the first, so the till can fix
    /// the whole batch in one pass.
    #[error("Products not found: {0:?}")]
    ProductsNotFound(Vec<i64>),

    /// One or more referenced customers do not exist.
    #[error("Customers not found: {0:?}")]
    CustomersNotFound(Vec<i64>),

    /// Consolidated demand exceeds what is on the shelf.
    ///
    /// ## User Workflow
    /// ```text
    /// Voucher A: product 7 × 6
    /// Voucher B: product 7 × 6
    ///      │
    ///      ▼
    /// consolidated demand = 12, available = 10
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, name: "cola", available: 10, requested: 12 }
    /// ```
    #[error("Insufficient stock for {name} (id {product_id}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any lock is taken or any row is read.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. unknown sort column).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Collection has more entries than allowed.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Duplicate value (e.g. a product name already in use).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            name: "cola".to_string(),
            available: 10,
            requested: 12,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for cola (id 7): available 10, requested 12"
        );
    }

    #[test]
    fn test_not_found_lists_every_id() {
        let err = CoreError::ProductsNotFound(vec![3, 9]);
        assert_eq!(err.to_string(), "Products not found: [3, 9]");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::TooMany {
            field: "vouchers".to_string(),
            max: 50,
        };
        assert_eq!(err.to_string(), "vouchers cannot have more than 50 entries");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
