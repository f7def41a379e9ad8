//! # Voucher Repository
//!
//! Read side of vouchers. Writes go through
//! [`BatchCoordinator`](crate::coordinator::BatchCoordinator) only.
//!
//! ## Projections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list(filters, page, sort)          get_by_id(id)                       │
//! │    vouchers v                         vouchers v                        │
//! │    LEFT JOIN customers cu               + items with total_quantity_sold│
//! │    items: total_quantity_sold = 0         (historical Σ per product)    │
//! │    customer embedded                  customer embedded                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::customer::CUSTOMER_COLUMNS;
use smartpos_core::{
    Customer, Page, PageRequest, SortOrder, Voucher, VoucherDetail, VoucherItemDetail, VoucherQuery,
};

/// Columns a client may sort the voucher listing by.
pub const VOUCHER_SORT_COLUMNS: &[&str] = &[
    "id",
    "voucher_number",
    "subtotal_cents",
    "total_amount_cents",
    "created_at",
    "staff_id",
];

pub const DEFAULT_VOUCHER_SORT: &str = "created_at";

pub(crate) const VOUCHER_COLUMNS: &str = "v.id AS id, v.voucher_number AS voucher_number, \
    v.subtotal_cents AS subtotal_cents, v.total_amount_cents AS total_amount_cents, \
    v.total_discount_cents AS total_discount_cents, \
    v.discount_percentage_bps AS discount_percentage_bps, \
    v.discount_amount_cents AS discount_amount_cents, v.created_at AS created_at, \
    v.staff_id AS staff_id, v.customer_id AS customer_id, v.delivery_address AS delivery_address";

static VOUCHER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a voucher number: `INV-YYYYMMDD-HHMMSSffffff-NNNNNN`.
///
/// The timestamp is UTC with microseconds; the suffix is a process-wide
/// sequence modulo one million. The unique index on `voucher_number` is
/// the final guard.
pub fn next_voucher_number(now: DateTime<Utc>) -> String {
    let seq = VOUCHER_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 1_000_000;
    format!("INV-{}-{seq:06}", now.format("%Y%m%d-%H%M%S%6f"))
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    voucher_id: i64,
    #[sqlx(flatten)]
    detail: VoucherItemDetail,
}

fn push_filters(qb: &mut QueryBuilder<'static, Sqlite>, q: &VoucherQuery) {
    qb.push(" WHERE 1 = 1");

    if let Some(name) = q.customer_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        qb.push(" AND cu.name LIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(staff_id) = q.staff_id {
        qb.push(" AND v.staff_id = ").push_bind(staff_id);
    }
    if let Some(start) = q.start_date {
        qb.push(" AND v.created_at >= ").push_bind(start);
    }
    if let Some(end) = q.end_date {
        qb.push(" AND v.created_at <= ").push_bind(end);
    }
}

#[derive(Debug, Clone)]
pub struct VoucherRepository {
    pool: SqlitePool,
}

impl VoucherRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VoucherRepository { pool }
    }

    /// Returns one page of vouchers with their items and customer.
    ///
    /// ## Arguments
    /// * `sort` - A column from [`VOUCHER_SORT_COLUMNS`] and a direction
    pub async fn list(
        &self,
        filters: &VoucherQuery,
        page: PageRequest,
        sort: (&str, SortOrder),
    ) -> DbResult<Page<VoucherDetail>> {
        let (column, order) = sort;
        if !VOUCHER_SORT_COLUMNS.contains(&column) {
            return Err(DbError::QueryFailed(format!("unsupported sort column {column}")));
        }

        debug!(page = page.page, size = page.size, sort = column, "Listing vouchers");

        let mut count = QueryBuilder::new(
            "SELECT COUNT(*) FROM vouchers v LEFT JOIN customers cu ON cu.id = v.customer_id",
        );
        push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers v LEFT JOIN customers cu ON cu.id = v.customer_id"
        ));
        push_filters(&mut qb, filters);
        qb.push(format!(" ORDER BY v.{column} {dir}, v.id {dir}", dir = order.as_sql()));
        qb.push(" LIMIT ").push_bind(page.size);
        qb.push(" OFFSET ").push_bind(page.offset());

        let vouchers: Vec<Voucher> = qb.build_query_as::<Voucher>().fetch_all(&self.pool).await?;

        let ids: Vec<i64> = vouchers.iter().map(|v| v.id).collect();
        let mut items = self.items_for(&ids, false).await?;
        let mut customers = self.customers_for(&vouchers).await?;

        let items = vouchers
            .into_iter()
            .map(|voucher| VoucherDetail {
                items: items.remove(&voucher.id).unwrap_or_default(),
                customer: voucher.customer_id.and_then(|id| customers.remove(&id)),
                voucher,
            })
            .collect();

        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }

    /// Gets one voucher. Its items carry the historical units sold of
    /// each product.
    pub async fn get_by_id(&self, id: i64) -> DbResult<VoucherDetail> {
        let voucher = sqlx::query_as::<_, Voucher>(&format!(
            "SELECT {VOUCHER_COLUMNS} FROM vouchers v WHERE v.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Voucher", id))?;

        let items = self
            .items_for(&[id], true)
            .await?
            .remove(&id)
            .unwrap_or_default();

        let mut customers = self.customers_for(std::slice::from_ref(&voucher)).await?;
        let customer = voucher.customer_id.and_then(|cid| customers.remove(&cid));

        Ok(VoucherDetail {
            voucher,
            customer,
            items,
        })
    }

    /// Counts all vouchers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vouchers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn items_for(
        &self,
        voucher_ids: &[i64],
        with_totals: bool,
    ) -> DbResult<HashMap<i64, Vec<VoucherItemDetail>>> {
        let mut grouped: HashMap<i64, Vec<VoucherItemDetail>> = HashMap::new();
        if voucher_ids.is_empty() {
            return Ok(grouped);
        }

        let total_sold = if with_totals {
            "(SELECT COALESCE(SUM(s.quantity), 0) FROM voucher_items s WHERE s.product_id = vi.product_id)"
        } else {
            "0"
        };

        let mut qb = QueryBuilder::new(format!(
            "SELECT vi.voucher_id AS voucher_id, vi.product_id AS product_id, \
             p.name AS product_name, vi.quantity AS quantity, \
             vi.price_at_sale_cents AS price_at_sale_cents, vi.subtotal_cents AS subtotal_cents, \
             {total_sold} AS total_quantity_sold \
             FROM voucher_items vi JOIN products p ON p.id = vi.product_id \
             WHERE vi.voucher_id IN ("
        ));
        let mut separated = qb.separated(", ");
        for id in voucher_ids {
            separated.push_bind(*id);
        }
        qb.push(") ORDER BY vi.voucher_id, vi.id");

        let rows: Vec<ItemRow> = qb.build_query_as::<ItemRow>().fetch_all(&self.pool).await?;
        for row in rows {
            grouped.entry(row.voucher_id).or_default().push(row.detail);
        }
        Ok(grouped)
    }

    async fn customers_for(&self, vouchers: &[Voucher]) -> DbResult<HashMap<i64, Customer>> {
        let mut ids: Vec<i64> = vouchers.iter().filter_map(|v| v.customer_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb = QueryBuilder::new(
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id IN ("),
        );
        let mut separated = qb.separated(", ");
        for id in &ids {
            separated.push_bind(*id);
        }
        qb.push(")");

        let customers: Vec<Customer> = qb.build_query_as::<Customer>().fetch_all(&self.pool).await?;
        Ok(customers.into_iter().map(|c| (c.id, c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voucher_number_format() {
        let now = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 3, 9, 7, 5, 1).unwrap();
        let number = next_voucher_number(now);

        assert!(number.starts_with("INV-20240309-070501000000-"), "{number}");
        assert_eq!(number.len(), "INV-20240309-070501000000-000000".len());
    }

    #[test]
    fn test_voucher_numbers_differ_within_one_instant() {
        let now = Utc::now();
        let a = next_voucher_number(now);
        let b = next_voucher_number(now);
        assert_ne!(a, b);
    }
}
