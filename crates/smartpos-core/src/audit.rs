//! # Audit Entries
//!
//! Value objects describing who changed what.
//!
//! ## Why explicit snapshots?
//! Each audited table has a snapshot struct listing exactly the columns
//! worth keeping. Adding a column to `products` does not silently widen
//! the audit trail, and secrets (password hashes) can never leak into it.
//!
//! ```text
//! Product ──► ProductSnapshot ──┐
//! Category ─► CategorySnapshot ─┼──► AuditEntry { action, table, record_id,
//! Customer ─► CustomerSnapshot ─┤                 old_value, new_value,
//! Voucher ──► VoucherSnapshot ──┘                 user_id, timestamp }
//! ```
//!
//! Building an entry does no I/O. The db crate's recorder ships it to a
//! background worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Category, Customer, Product, Voucher};

// =============================================================================
// Actions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateStock,
    UpdateStock,
    DeleteStock,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    CreateCustomer,
    UpdateCustomer,
    DeleteCustomer,
    CreateVoucher,
}

impl AuditAction {
    /// The string stored in `audit_logs.action`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CreateStock => "CREATE_STOCK",
            AuditAction::UpdateStock => "UPDATE_STOCK",
            AuditAction::DeleteStock => "DELETE_STOCK",
            AuditAction::CreateCategory => "CREATE_CATEGORY",
            AuditAction::UpdateCategory => "UPDATE_CATEGORY",
            AuditAction::DeleteCategory => "DELETE_CATEGORY",
            AuditAction::CreateCustomer => "CREATE_CUSTOMER",
            AuditAction::UpdateCustomer => "UPDATE_CUSTOMER",
            AuditAction::DeleteCustomer => "DELETE_CUSTOMER",
            AuditAction::CreateVoucher => "CREATE_VOUCHER",
        }
    }
}

// =============================================================================
// Snapshots
// =============================================================================

/// A serializable picture of one audited row.
pub trait AuditSnapshot: Serialize {
    /// Table the row lives in.
    const TABLE: &'static str;

    fn record_id(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub price_cents: i64,
    pub cost_price_cents: Option<i64>,
    pub quantity: i64,
    pub discount_percent_bps: u32,
    pub discount_start: Option<DateTime<Utc>>,
    pub discount_end: Option<DateTime<Utc>>,
    pub arrival_date: DateTime<Utc>,
}

impl From<&Product> for ProductSnapshot {
    fn from(p: &Product) -> Self {
        ProductSnapshot {
            id: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            category_id: p.category_id,
            price_cents: p.price_cents,
            cost_price_cents: p.cost_price_cents,
            quantity: p.quantity,
            discount_percent_bps: p.discount_percent_bps,
            discount_start: p.discount_start,
            discount_end: p.discount_end,
            arrival_date: p.arrival_date,
        }
    }
}

impl AuditSnapshot for ProductSnapshot {
    const TABLE: &'static str = "products";

    fn record_id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub id: i64,
    pub name: String,
}

impl From<&Category> for CategorySnapshot {
    fn from(c: &Category) -> Self {
        CategorySnapshot {
            id: c.id,
            name: c.name.clone(),
        }
    }
}

impl AuditSnapshot for CategorySnapshot {
    const TABLE: &'static str = "categories";

    fn record_id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub points: i64,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(c: &Customer) -> Self {
        CustomerSnapshot {
            id: c.id,
            name: c.name.clone(),
            phone: c.phone.clone(),
            email: c.email.clone(),
            points: c.points,
        }
    }
}

impl AuditSnapshot for CustomerSnapshot {
    const TABLE: &'static str = "customers";

    fn record_id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherSnapshot {
    pub id: i64,
    pub voucher_number: String,
    pub subtotal_cents: i64,
    pub total_discount_cents: i64,
    pub total_amount_cents: i64,
    pub customer_id: Option<i64>,
    pub item_count: usize,
}

impl VoucherSnapshot {
    pub fn new(voucher: &Voucher, item_count: usize) -> Self {
        VoucherSnapshot {
            id: voucher.id,
            voucher_number: voucher.voucher_number.clone(),
            subtotal_cents: voucher.subtotal_cents,
            total_discount_cents: voucher.total_discount_cents,
            total_amount_cents: voucher.total_amount_cents,
            customer_id: voucher.customer_id,
            item_count,
        }
    }
}

impl AuditSnapshot for VoucherSnapshot {
    const TABLE: &'static str = "vouchers";

    fn record_id(&self) -> i64 {
        self.id
    }
}

// =============================================================================
// Entry
// =============================================================================

/// One row of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub table_name: &'static str,
    pub record_id: i64,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Entry for a newly created row.
    pub fn created<S: AuditSnapshot>(
        action: AuditAction,
        after: &S,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Self {
        AuditEntry {
            action,
            table_name: S::TABLE,
            record_id: after.record_id(),
            old_value: None,
            new_value: serde_json::to_value(after).ok(),
            user_id,
            timestamp: at,
        }
    }

    /// Entry for a modified row, with before and after pictures.
    pub fn updated<S: AuditSnapshot>(
        action: AuditAction,
        before: &S,
        after: &S,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Self {
        AuditEntry {
            action,
            table_name: S::TABLE,
            record_id: after.record_id(),
            old_value: serde_json::to_value(before).ok(),
            new_value: serde_json::to_value(after).ok(),
            user_id,
            timestamp: at,
        }
    }

    /// Entry for a removed row.
    pub fn deleted<S: AuditSnapshot>(
        action: AuditAction,
        before: &S,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Self {
        AuditEntry {
            action,
            table_name: S::TABLE,
            record_id: before.record_id(),
            old_value: serde_json::to_value(before).ok(),
            new_value: None,
            user_id,
            timestamp: at,
        }
    }
}
