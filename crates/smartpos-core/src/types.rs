//! # Domain Types
//!
//! Core domain types used throughout Smart POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │     Voucher     │   │  VoucherItem    │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (i64)       │◄──┼─ (via items) ───┼───│  product_id     │        │
//! │  │  name (lower)   │   │  voucher_number │   │  voucher_id ────┼──► owns│
//! │  │  price_cents    │   │  subtotal_cents │   │  price_at_sale  │        │
//! │  │  quantity ≥ 0   │   │  total_amount   │   │  subtotal_cents │        │
//! │  │  discount_bps   │   │  staff_id       │   └─────────────────┘        │
//! │  └─────────────────┘   │  customer_id?   │                              │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Category     │   │    Customer     │   │      User       │        │
//! │  │  name (UPPER)   │   │  phone unique   │   │  role           │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every persisted record is keyed by an SQLite `INTEGER PRIMARY KEY`.
//! Voucher numbers are the only human-facing business identifier.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::DiscountWindow;

// =============================================================================
// Role
// =============================================================================

/// Staff role. Managers may edit and delete stock; staff may only sell
/// and create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Staff,
}

impl Role {
    /// Stable string form, as stored in the database and in tokens.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// Parses the stored string form.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "manager" => Some(Role::Manager),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_manager(&self) -> bool {
        matches!(self, Role::Manager)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Staff
    }
}

// =============================================================================
// User
// =============================================================================

/// A staff account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Category
// =============================================================================

/// A product category. Names are stored trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Payload for creating or renaming a category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A stock item available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name, stored trimmed and lowercased. Unique.
    pub name: String,

    pub description: Option<String>,

    pub category_id: Option<i64>,

    /// Sell price in cents.
    pub price_cents: i64,

    /// Buy price in cents.
    pub cost_price_cents: Option<i64>,

    /// Units on the shelf. Never negative.
    pub quantity: i64,

    /// Discount in basis points (1500 = 15%). Zero means no discount.
    pub discount_percent_bps: u32,

    /// Inclusive start of the discount window. Unset means "since forever".
    #[ts(as = "Option<String>")]
    pub discount_start: Option<DateTime<Utc>>,

    /// Inclusive end of the discount window. Unset means "until further notice".
    #[ts(as = "Option<String>")]
    pub discount_end: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub arrival_date: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub last_sold_at: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the product's discount window.
    #[inline]
    pub fn discount_window(&self) -> DiscountWindow {
        DiscountWindow {
            percent_bps: self.discount_percent_bps,
            start: self.discount_start,
            end: self.discount_end,
        }
    }

    /// Checks if the shelf holds at least `quantity` units.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Payload for creating a product or replacing its editable fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub price_cents: i64,
    #[serde(default)]
    pub cost_price_cents: Option<i64>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub discount_percent_bps: u32,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub discount_start: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub discount_end: Option<DateTime<Utc>>,
    /// Defaults to the creation time when omitted.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub arrival_date: Option<DateTime<Utc>>,
}

/// A product as shown in inventory listings.
///
/// `total_sold`, `is_on_sale` and `sale_price_cents` are computed when the
/// row is read and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockView {
    #[serde(flatten)]
    #[ts(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub total_sold: i64,
    pub is_on_sale: bool,
    pub sale_price_cents: Option<i64>,
}

impl StockView {
    /// Builds the listing row, evaluating the discount window at `at`.
    pub fn new(
        product: Product,
        category_name: Option<String>,
        total_sold: i64,
        at: DateTime<Utc>,
    ) -> Self {
        let sale_price = crate::pricing::sale_price(&product, at);
        StockView {
            product,
            category_name,
            total_sold,
            is_on_sale: sale_price.is_some(),
            sale_price_cents: sale_price.map(|m| m.cents()),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Unique when present.
    pub phone: Option<String>,
    pub email: Option<String>,
    pub points: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
}

// =============================================================================
// Voucher
// =============================================================================

/// A persisted sales receipt header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Voucher {
    pub id: i64,
    /// `INV-YYYYMMDD-HHMMSSffffff-NNNNNN`. Unique.
    pub voucher_number: String,
    pub subtotal_cents: i64,
    /// Amount due after discounts. Never negative.
    pub total_amount_cents: i64,
    pub total_discount_cents: i64,
    pub discount_percentage_bps: u32,
    pub discount_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub staff_id: i64,
    pub customer_id: Option<i64>,
    pub delivery_address: Option<String>,
}

/// One product line within a voucher, with its price frozen at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VoucherItem {
    pub id: i64,
    pub voucher_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price_at_sale_cents: i64,
    pub subtotal_cents: i64,
}

impl VoucherItem {
    #[inline]
    pub fn price_at_sale(&self) -> Money {
        Money::from_cents(self.price_at_sale_cents)
    }
}

/// One requested line of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoucherLineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// A sale the till wants recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoucherRequest {
    pub items: Vec<VoucherLineRequest>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    /// Voucher-level percentage discount in basis points.
    #[serde(default)]
    pub discount_percentage_bps: Option<u32>,
    /// Voucher-level fixed discount in cents.
    #[serde(default)]
    pub discount_amount_cents: Option<i64>,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

/// Body of `POST /vouchers`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateVouchersRequest {
    pub vouchers: Vec<VoucherRequest>,
}

/// A voucher line as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VoucherItemDetail {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price_at_sale_cents: i64,
    pub subtotal_cents: i64,
    /// Historical units sold of this product across all vouchers.
    /// Only filled on single-voucher reads; zero in listings.
    pub total_quantity_sold: i64,
}

/// A voucher with its lines and customer, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VoucherDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub voucher: Voucher,
    pub customer: Option<Customer>,
    pub items: Vec<VoucherItemDetail>,
}

// =============================================================================
// Queries & Pagination
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Filters, sort and paging for the inventory listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct StockQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub sell_price_gt: Option<i64>,
    pub sell_price_lt: Option<i64>,
    pub buy_price_gt: Option<i64>,
    pub buy_price_lt: Option<i64>,
    pub quantity_gt: Option<i64>,
    pub quantity_lt: Option<i64>,
    pub total_sold_gt: Option<i64>,
    pub total_sold_lt: Option<i64>,
    #[ts(as = "Option<String>")]
    pub arrival_date_eq: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub arrival_date_start: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub arrival_date_end: Option<NaiveDate>,
}

/// Filters, sort and paging for the voucher listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct VoucherQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub customer_name: Option<String>,
    pub staff_id: Option<i64>,
    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CustomerQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Name or phone substring, at least two characters.
    pub search: Option<String>,
}

/// Resolved page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    #[inline]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DashboardStats {
    pub total_revenue_cents: i64,
    pub vouchers_issued: i64,
    pub new_customers: i64,
    pub products_in_stock: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(discount_bps: u32) -> Product {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product {
            id: 1,
            name: "cola".to_string(),
            description: None,
            category_id: None,
            price_cents: 1000,
            cost_price_cents: Some(600),
            quantity: 4,
            discount_percent_bps: discount_bps,
            discount_start: None,
            discount_end: None,
            arrival_date: at,
            last_sold_at: None,
            created_at: at,
        }
    }

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!(Role::parse(Role::Manager.as_str()), Some(Role::Manager));
        assert_eq!(Role::parse("staff"), Some(Role::Staff));
        assert_eq!(Role::parse("owner"), None);
        assert!(Role::Manager.is_manager());
        assert!(!Role::default().is_manager());
    }

    #[test]
    fn test_can_sell() {
        let p = product(0);
        assert!(p.can_sell(4));
        assert!(!p.can_sell(5));
    }

    #[test]
    fn test_stock_view_computes_sale_price() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let view = StockView::new(product(2000), Some("DRINKS".to_string()), 3, at);
        assert!(view.is_on_sale);
        assert_eq!(view.sale_price_cents, Some(800));

        let view = StockView::new(product(0), None, 0, at);
        assert!(!view.is_on_sale);
        assert_eq!(view.sale_price_cents, None);
    }

    #[test]
    fn test_user_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "admin".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            full_name: None,
            role: Role::Manager,
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"manager\""));
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(PageRequest { page: 1, size: 20 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, size: 10 }.offset(), 20);
    }
}
