//! # Validation Module
//!
//! Input validation and normalization for Smart POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (axum Json / Query)                           │
//! │  └── Type validation (deserialization)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Name normalization (trim, case)                                    │
//! │  ├── Quantity / discount ranges                                         │
//! │  └── Batch shape, before any lock is taken                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── UNIQUE constraints                                                 │
//! │  ├── CHECK (quantity >= 0)                                              │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use smartpos_core::validation::{normalize_product_name, validate_quantity};
//!
//! assert_eq!(normalize_product_name("  Green Tea ").unwrap(), "green tea");
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::BPS_SCALE;
use crate::types::{PageRequest, ProductInput, SortOrder, VoucherRequest};
use crate::{
    DEFAULT_PAGE_SIZE, MAX_BATCH_VOUCHERS, MAX_DISCOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_PAGE_SIZE,
    MAX_PRICE_CENTS, MAX_VOUCHER_LINES, MIN_SEARCH_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

fn require_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

/// Trims and lowercases a product name.
///
/// ## Example
/// ```rust
/// use smartpos_core::validation::normalize_product_name;
///
/// assert_eq!(normalize_product_name("Coca-Cola 330ml").unwrap(), "coca-cola 330ml");
/// assert!(normalize_product_name("   ").is_err());
/// ```
pub fn normalize_product_name(name: &str) -> ValidationResult<String> {
    require_name("name", name).map(|n| n.to_lowercase())
}

/// Trims and uppercases a category name.
pub fn normalize_category_name(name: &str) -> ValidationResult<String> {
    require_name("name", name).map(|n| n.to_uppercase())
}

/// Trims a customer name.
pub fn normalize_customer_name(name: &str) -> ValidationResult<String> {
    require_name("name", name)
}

/// Trims an optional free-text field, mapping blank to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a customer search term.
///
/// ## Rules
/// - At least two characters after trimming
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed term.
pub fn validate_search_term(term: &str) -> ValidationResult<String> {
    let term = term.trim();

    if term.chars().count() < MIN_SEARCH_LEN {
        return Err(ValidationError::TooShort {
            field: "search".to_string(),
            min: MIN_SEARCH_LEN,
        });
    }

    if term.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(term.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (zero-quantity lines are rejected)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a percentage in basis points (0..=10000).
pub fn validate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > BPS_SCALE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: BPS_SCALE as i64,
        });
    }
    Ok(())
}

/// Validates a money amount that may be zero but not negative.
pub fn validate_non_negative(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a money amount in `0..=max` cents.
pub fn validate_amount(field: &str, cents: i64, max: i64) -> ValidationResult<()> {
    if !(0..=max).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }
    Ok(())
}

fn validate_window(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> ValidationResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(ValidationError::InvalidFormat {
                field: "discount_end".to_string(),
                reason: "must not be before discount_start".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a product payload and returns it with its name normalized.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<ProductInput> {
    let name = normalize_product_name(&input.name)?;
    validate_amount("price_cents", input.price_cents, MAX_PRICE_CENTS)?;
    if let Some(cost) = input.cost_price_cents {
        validate_amount("cost_price_cents", cost, MAX_PRICE_CENTS)?;
    }
    validate_non_negative("quantity", input.quantity)?;
    validate_bps("discount_percent_bps", input.discount_percent_bps)?;
    validate_window(input.discount_start, input.discount_end)?;

    Ok(ProductInput {
        name,
        description: normalize_optional(input.description.as_deref()),
        ..input.clone()
    })
}

/// Validates one voucher request.
pub fn validate_voucher_request(request: &VoucherRequest) -> ValidationResult<()> {
    if request.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if request.items.len() > MAX_VOUCHER_LINES {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_VOUCHER_LINES,
        });
    }

    for line in &request.items {
        validate_quantity(line.quantity)?;
    }

    if let Some(bps) = request.discount_percentage_bps {
        validate_bps("discount_percentage_bps", bps)?;
    }
    if let Some(amount) = request.discount_amount_cents {
        validate_amount("discount_amount_cents", amount, MAX_DISCOUNT_CENTS)?;
    }

    Ok(())
}

/// Validates the shape of a whole batch.
///
/// Runs before any row is read, so a malformed batch never takes the
/// write lock.
pub fn validate_batch(requests: &[VoucherRequest]) -> ValidationResult<()> {
    if requests.is_empty() {
        return Err(ValidationError::Required {
            field: "vouchers".to_string(),
        });
    }

    if requests.len() > MAX_BATCH_VOUCHERS {
        return Err(ValidationError::TooMany {
            field: "vouchers".to_string(),
            max: MAX_BATCH_VOUCHERS,
        });
    }

    requests.iter().try_for_each(validate_voucher_request)
}

// =============================================================================
// Listing Parameters
// =============================================================================

/// Resolves page coordinates, applying defaults.
pub fn resolve_page(page: Option<i64>, size: Option<i64>) -> ValidationResult<PageRequest> {
    let page = page.unwrap_or(1);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err(ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE,
        });
    }

    Ok(PageRequest { page, size })
}

/// Resolves a requested sort column against a whitelist.
///
/// Returns the column and direction, defaulting to `default_column`
/// descending. Unknown columns are rejected rather than silently ignored.
pub fn resolve_sort<'a>(
    requested: Option<&str>,
    order: Option<SortOrder>,
    allowed: &[&'a str],
    default_column: &'a str,
) -> ValidationResult<(&'a str, SortOrder)> {
    let order = order.unwrap_or_default();
    match requested.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok((default_column, order)),
        Some(column) => allowed
            .iter()
            .find(|allowed| **allowed == column)
            .map(|column| (*column, order))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "sort_by".to_string(),
                allowed: allowed.iter().map(|c| c.to_string()).collect(),
            }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoucherLineRequest;

    fn request(lines: &[(i64, i64)]) -> VoucherRequest {
        VoucherRequest {
            items: lines
                .iter()
                .map(|&(product_id, quantity)| VoucherLineRequest { product_id, quantity })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_product_name(" Green TEA ").unwrap(), "green tea");
        assert_eq!(normalize_category_name(" drinks").unwrap(), "DRINKS");
        assert!(matches!(
            normalize_category_name("  "),
            Err(ValidationError::Required { .. })
        ));
        assert!(normalize_product_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  ")), None);
        assert_eq!(normalize_optional(Some(" a ")), Some("a".to_string()));
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_search_term_min_length() {
        assert!(validate_search_term("a").is_err());
        assert!(validate_search_term(" a ").is_err());
        assert_eq!(validate_search_term(" ab ").unwrap(), "ab");
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_bps() {
        assert!(validate_bps("d", 0).is_ok());
        assert!(validate_bps("d", 10_000).is_ok());
        assert!(validate_bps("d", 10_001).is_err());
    }

    #[test]
    fn test_batch_rejects_empty_and_oversized() {
        assert!(validate_batch(&[]).is_err());
        assert!(validate_batch(&[request(&[])]).is_err());
        assert!(validate_batch(&[request(&[(1, 1)]), request(&[(2, 0)])]).is_err());

        let oversized: Vec<_> = (0..=MAX_BATCH_VOUCHERS).map(|_| request(&[(1, 1)])).collect();
        assert!(matches!(
            validate_batch(&oversized),
            Err(ValidationError::TooMany { .. })
        ));

        assert!(validate_batch(&[request(&[(1, 2), (2, 3)])]).is_ok());
    }

    #[test]
    fn test_request_discount_ranges() {
        let mut r = request(&[(1, 1)]);
        r.discount_percentage_bps = Some(10_001);
        assert!(validate_voucher_request(&r).is_err());

        let mut r = request(&[(1, 1)]);
        r.discount_amount_cents = Some(-5);
        assert!(validate_voucher_request(&r).is_err());

        let mut r = request(&[(1, 1)]);
        r.discount_percentage_bps = Some(1000);
        r.discount_amount_cents = Some(i64::MAX);
        assert!(matches!(
            validate_batch(&[r]),
            Err(ValidationError::OutOfRange { max: MAX_DISCOUNT_CENTS, .. })
        ));

        let mut r = request(&[(1, 1)]);
        r.discount_amount_cents = Some(MAX_DISCOUNT_CENTS);
        assert!(validate_voucher_request(&r).is_ok());
    }

    #[test]
    fn test_product_price_ceiling() {
        let input = ProductInput {
            name: "gold".to_string(),
            description: None,
            category_id: None,
            price_cents: i64::MAX,
            cost_price_cents: None,
            quantity: 1,
            discount_percent_bps: 0,
            discount_start: None,
            discount_end: None,
            arrival_date: None,
        };
        assert!(validate_product_input(&input).is_err());

        let cost_too_high = ProductInput {
            price_cents: MAX_PRICE_CENTS,
            cost_price_cents: Some(MAX_PRICE_CENTS + 1),
            ..input.clone()
        };
        assert!(validate_product_input(&cost_too_high).is_err());

        assert!(validate_product_input(&ProductInput {
            price_cents: MAX_PRICE_CENTS,
            ..input
        })
        .is_ok());
    }

    #[test]
    fn test_product_input_window_order() {
        let now = Utc::now();
        let input = ProductInput {
            name: " Rice ".to_string(),
            description: Some("  ".to_string()),
            category_id: None,
            price_cents: 100,
            cost_price_cents: None,
            quantity: 1,
            discount_percent_bps: 500,
            discount_start: Some(now),
            discount_end: Some(now - chrono::Duration::days(1)),
            arrival_date: None,
        };
        assert!(validate_product_input(&input).is_err());

        let ok = validate_product_input(&ProductInput {
            discount_end: None,
            ..input
        })
        .unwrap();
        assert_eq!(ok.name, "rice");
        assert_eq!(ok.description, None);
    }

    #[test]
    fn test_resolve_page() {
        assert_eq!(resolve_page(None, None).unwrap(), PageRequest { page: 1, size: DEFAULT_PAGE_SIZE });
        assert!(resolve_page(Some(0), None).is_err());
        assert!(resolve_page(None, Some(0)).is_err());
        assert!(resolve_page(None, Some(MAX_PAGE_SIZE + 1)).is_err());
    }

    #[test]
    fn test_resolve_sort() {
        let allowed = ["id", "name"];
        assert_eq!(resolve_sort(None, None, &allowed, "id").unwrap(), ("id", SortOrder::Desc));
        assert_eq!(
            resolve_sort(Some("name"), Some(SortOrder::Asc), &allowed, "id").unwrap(),
            ("name", SortOrder::Asc)
        );
        assert!(resolve_sort(Some("password"), None, &allowed, "id").is_err());
    }
}
