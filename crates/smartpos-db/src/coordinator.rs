//! # Batch Transaction Coordinator
//!
//! Commits a batch of vouchers as one all-or-nothing unit.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  requests                                                               │
//! │     │                                                                   │
//! │  1. validate_batch ─────────────── no lock, no read ──► ValidationError │
//! │  2. BatchDemand::collect           { product_id → Σ quantity }          │
//! │     │                                                                   │
//! │  ── BEGIN ───────────────────────────────────────────────────────────── │
//! │  3. lock    UPDATE products SET quantity = quantity WHERE id IN (..)    │
//! │     fetch   products + customers ──────────────► Products/Customers     │
//! │                                                  NotFound (every id)    │
//! │  4. check   Σ demand ≤ quantity ───────────────► InsufficientStock      │
//! │  5. reserve quantity -= Σ demand  WHERE quantity >= Σ demand            │
//! │  6. price   effective_price(product, now) per line                      │
//! │     assemble totals, insert voucher + items                             │
//! │  7. stamp   last_sold_at = now                                          │
//! │  ── COMMIT ──────────────────────────────────────────────────────────── │
//! │  8. audit   one CREATE_VOUCHER per voucher (fire-and-forget)            │
//! │  9. return  details in request order                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error before COMMIT drops the transaction, which rolls it back.
//!
//! ## Locking
//! SQLite has no `SELECT ... FOR UPDATE`. Touching the rows with a no-op
//! UPDATE as the first statement takes the database write lock before
//! anything is read, so the stock check always sees committed state. A
//! second batch waits in `busy_timeout`; if the wait expires the error
//! surfaces as [`DbError::Conflict`]. Rows are touched in ascending id
//! order so the same code stays deadlock-free on row-locking stores.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audit::AuditRecorder;
use crate::error::DbError;
use crate::repository::customer::CUSTOMER_COLUMNS;
use crate::repository::product::PRODUCT_COLUMNS;
use crate::repository::voucher::next_voucher_number;
use smartpos_core::audit::{AuditAction, AuditEntry, VoucherSnapshot};
use smartpos_core::batch::{customer_ids, BatchDemand};
use smartpos_core::validation::validate_batch;
use smartpos_core::voucher::{assemble, PricedLine};
use smartpos_core::{
    CoreError, Customer, Money, Product, ValidationError, Voucher, VoucherDetail, VoucherItemDetail,
    VoucherRequest,
};

/// Why a batch was not committed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Rejected by a business rule. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The database failed or the lock wait expired. Nothing was written.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Db(DbError::from(err))
    }
}

/// Pushes `(id, id, ...)` with every id bound.
fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    qb.push(")");
}

/// Ids in `wanted` that `found` lacks, ascending.
fn missing_ids(wanted: &[i64], found: impl Fn(i64) -> bool) -> Vec<i64> {
    wanted.iter().copied().filter(|id| !found(*id)).collect()
}

#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    pool: SqlitePool,
    audit: AuditRecorder,
}

impl BatchCoordinator {
    pub fn new(pool: SqlitePool, audit: AuditRecorder) -> Self {
        BatchCoordinator { pool, audit }
    }

    /// Creates every voucher of `requests` or none of them.
    ///
    /// ## Returns
    /// One [`VoucherDetail`] per request, in request order.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a malformed batch, before any lock
    /// - `Core(ProductsNotFound | CustomersNotFound)` listing every missing id
    /// - `Core(InsufficientStock)` for the first product, by id, whose
    ///   consolidated demand exceeds its quantity
    /// - `Db(Conflict)` when the write lock could not be taken in time
    pub async fn create_batch(
        &self,
        requests: &[VoucherRequest],
        staff_id: i64,
    ) -> Result<Vec<VoucherDetail>, CheckoutError> {
        validate_batch(requests)?;

        let demand = BatchDemand::collect(requests);
        let product_ids = demand.product_ids();
        let customer_ids = customer_ids(requests);

        debug!(
            vouchers = requests.len(),
            products = product_ids.len(),
            staff_id,
            "Starting voucher batch"
        );

        let mut tx = self.pool.begin().await?;

        lock_products(&mut *tx, &product_ids).await?;
        let products = fetch_products(&mut *tx, &product_ids).await?;
        let missing = missing_ids(&product_ids, |id| products.contains_key(&id));
        if !missing.is_empty() {
            return Err(CoreError::ProductsNotFound(missing).into());
        }

        let customers = fetch_customers(&mut *tx, &customer_ids).await?;
        let missing = missing_ids(&customer_ids, |id| customers.contains_key(&id));
        if !missing.is_empty() {
            return Err(CoreError::CustomersNotFound(missing).into());
        }

        for (product_id, requested) in demand.iter() {
            let product = &products[&product_id];
            if !product.can_sell(requested) {
                return Err(insufficient(product, requested).into());
            }
        }

        for (product_id, requested) in demand.iter() {
            let reserved = sqlx::query(
                "UPDATE products SET quantity = quantity - ? WHERE id = ? AND quantity >= ?",
            )
            .bind(requested)
            .bind(product_id)
            .bind(requested)
            .execute(&mut *tx)
            .await?;

            if reserved.rows_affected() == 0 {
                return Err(insufficient(&products[&product_id], requested).into());
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            let detail =
                insert_voucher(&mut *tx, request, &products, &customers, staff_id, now).await?;
            created.push(detail);
        }

        let mut stamp = QueryBuilder::<Sqlite>::new("UPDATE products SET last_sold_at = ");
        stamp.push_bind(now).push(" WHERE id IN ");
        push_id_list(&mut stamp, &product_ids);
        stamp.build().execute(&mut *tx).await?;

        tx.commit().await?;

        info!(
            vouchers = created.len(),
            staff_id,
            total_cents = created.iter().map(|d| d.voucher.total_amount_cents).sum::<i64>(),
            "Voucher batch committed"
        );

        for detail in &created {
            self.audit.record(AuditEntry::created(
                AuditAction::CreateVoucher,
                &VoucherSnapshot::new(&detail.voucher, detail.items.len()),
                staff_id,
                now,
            ));
        }

        Ok(created)
    }
}

fn insufficient(product: &Product, requested: i64) -> CoreError {
    warn!(
        product_id = product.id,
        available = product.quantity,
        requested,
        "Insufficient stock"
    );
    CoreError::InsufficientStock {
        product_id: product.id,
        name: product.name.clone(),
        available: product.quantity,
        requested,
    }
}

/// Takes the write lock on `ids`, ascending.
async fn lock_products(conn: &mut SqliteConnection, ids: &[i64]) -> Result<(), DbError> {
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE products SET quantity = quantity WHERE id IN ");
    push_id_list(&mut qb, ids);
    qb.build().execute(&mut *conn).await?;
    Ok(())
}

async fn fetch_products(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<HashMap<i64, Product>, DbError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id IN "));
    push_id_list(&mut qb, ids);
    qb.push(" ORDER BY p.id");

    let rows: Vec<Product> = qb.build_query_as::<Product>().fetch_all(&mut *conn).await?;
    Ok(rows.into_iter().map(|p| (p.id, p)).collect())
}

async fn fetch_customers(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<HashMap<i64, Customer>, DbError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id IN "));
    push_id_list(&mut qb, ids);

    let rows: Vec<Customer> = qb.build_query_as::<Customer>().fetch_all(&mut *conn).await?;
    Ok(rows.into_iter().map(|c| (c.id, c)).collect())
}

/// Prices one request and writes its voucher and items.
async fn insert_voucher(
    conn: &mut SqliteConnection,
    request: &VoucherRequest,
    products: &HashMap<i64, Product>,
    customers: &HashMap<i64, Customer>,
    staff_id: i64,
    now: DateTime<Utc>,
) -> Result<VoucherDetail, DbError> {
    let lines: Vec<PricedLine> = request
        .items
        .iter()
        .map(|line| PricedLine::for_product(&products[&line.product_id], line.quantity, now))
        .collect();

    let discount_bps = request.discount_percentage_bps.unwrap_or(0);
    let discount_amount = Money::from_cents(request.discount_amount_cents.unwrap_or(0));
    let totals = assemble(&lines, discount_bps, discount_amount);

    let mut voucher = Voucher {
        id: 0,
        voucher_number: next_voucher_number(now),
        subtotal_cents: totals.subtotal.cents(),
        total_amount_cents: totals.final_amount.cents(),
        total_discount_cents: totals.total_discount.cents(),
        discount_percentage_bps: discount_bps,
        discount_amount_cents: discount_amount.cents(),
        created_at: now,
        staff_id,
        customer_id: request.customer_id,
        delivery_address: request.delivery_address.clone(),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO vouchers (
            voucher_number, subtotal_cents, total_amount_cents, total_discount_cents,
            discount_percentage_bps, discount_amount_cents, created_at, staff_id,
            customer_id, delivery_address
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&voucher.voucher_number)
    .bind(voucher.subtotal_cents)
    .bind(voucher.total_amount_cents)
    .bind(voucher.total_discount_cents)
    .bind(voucher.discount_percentage_bps)
    .bind(voucher.discount_amount_cents)
    .bind(voucher.created_at)
    .bind(voucher.staff_id)
    .bind(voucher.customer_id)
    .bind(&voucher.delivery_address)
    .execute(&mut *conn)
    .await?;
    voucher.id = result.last_insert_rowid();

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        sqlx::query(
            "INSERT INTO voucher_items (voucher_id, product_id, quantity, price_at_sale_cents, subtotal_cents)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(voucher.id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price.cents())
        .bind(line.subtotal.cents())
        .execute(&mut *conn)
        .await?;

        items.push(VoucherItemDetail {
            product_id: line.product_id,
            product_name: products[&line.product_id].name.clone(),
            quantity: line.quantity,
            price_at_sale_cents: line.unit_price.cents(),
            subtotal_cents: line.subtotal.cents(),
            total_quantity_sold: 0,
        });
    }

    debug!(voucher_id = voucher.id, number = %voucher.voucher_number, "Voucher inserted");

    Ok(VoucherDetail {
        customer: voucher.customer_id.and_then(|id| customers.get(&id).cloned()),
        voucher,
        items,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditWorker;
    use crate::pool::Database;
    use crate::testing::{
        file_db, file_db_with, memory_db, product_input, remove_file_db, seed_product, seed_staff,
    };
    use chrono::Duration;
    use smartpos_core::{NewCustomer, VoucherLineRequest};

    fn coordinator(db: &Database) -> (BatchCoordinator, AuditWorker) {
        let (recorder, worker) = AuditRecorder::channel(64, db.audit_logs());
        (db.coordinator(recorder), worker)
    }

    fn request(lines: &[(i64, i64)]) -> VoucherRequest {
        VoucherRequest {
            items: lines
                .iter()
                .map(|&(product_id, quantity)| VoucherLineRequest { product_id, quantity })
                .collect(),
            ..Default::default()
        }
    }

    async fn voucher_rows(db: &Database) -> (i64, i64) {
        let vouchers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vouchers")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM voucher_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        (vouchers, items)
    }

    async fn quantity(db: &Database, id: i64) -> i64 {
        db.products().get_by_id(id).await.unwrap().quantity
    }

    #[tokio::test]
    async fn test_batch_commits_in_request_order() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 1200, 10).await;
        let tea = seed_product(&db, "tea", 300, 10).await;
        let (coord, _worker) = coordinator(&db);

        let created = coord
            .create_batch(&[request(&[(tea.id, 2)]), request(&[(rice.id, 1), (tea.id, 1)])], staff)
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].voucher.subtotal_cents, 600);
        assert_eq!(created[0].items[0].product_name, "tea");
        assert_eq!(created[1].voucher.subtotal_cents, 1500);
        assert_eq!(created[1].voucher.total_amount_cents, 1500);
        assert_eq!(created[1].voucher.staff_id, staff);
        assert!(created.iter().all(|d| d.customer.is_none()));
    }

    #[tokio::test]
    async fn test_failing_last_request_rolls_back_everything() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 1200, 10).await;
        let tea = seed_product(&db, "tea", 300, 1).await;
        let (coord, _worker) = coordinator(&db);

        let err = coord
            .create_batch(&[request(&[(rice.id, 2)]), request(&[(tea.id, 5)])], staff)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::InsufficientStock { product_id, available: 1, requested: 5, .. })
                if product_id == tea.id
        ));
        assert_eq!(voucher_rows(&db).await, (0, 0));
        assert_eq!(quantity(&db, rice.id).await, 10);
        assert_eq!(quantity(&db, tea.id).await, 1);
        assert!(db.products().get_by_id(rice.id).await.unwrap().last_sold_at.is_none());
    }

    #[tokio::test]
    async fn test_stock_is_conserved() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 100, 10).await;
        let (coord, _worker) = coordinator(&db);

        coord
            .create_batch(&[request(&[(rice.id, 3)]), request(&[(rice.id, 2)])], staff)
            .await
            .unwrap();

        let sold: i64 = sqlx::query_scalar("SELECT SUM(quantity) FROM voucher_items WHERE product_id = ?")
            .bind(rice.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sold, 5);
        assert_eq!(quantity(&db, rice.id).await, 10 - sold);
    }

    #[tokio::test]
    async fn test_demand_is_consolidated_across_vouchers() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let cola = seed_product(&db, "cola", 150, 10).await;
        let (coord, _worker) = coordinator(&db);

        // 6 + 6 > 10 although each voucher alone fits
        let err = coord
            .create_batch(&[request(&[(cola.id, 6)]), request(&[(cola.id, 6)])], staff)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::InsufficientStock { available: 10, requested: 12, .. })
        ));
        assert_eq!(quantity(&db, cola.id).await, 10);
    }

    #[tokio::test]
    async fn test_every_missing_product_is_reported() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 100, 10).await;
        let (coord, _worker) = coordinator(&db);

        let err = coord
            .create_batch(&[request(&[(rice.id, 1), (9002, 1)]), request(&[(9001, 1)])], staff)
            .await
            .unwrap_err();

        match err {
            CheckoutError::Core(CoreError::ProductsNotFound(ids)) => assert_eq!(ids, vec![9001, 9002]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(quantity(&db, rice.id).await, 10);
    }

    #[tokio::test]
    async fn test_missing_customers_are_reported() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 100, 10).await;
        let (coord, _worker) = coordinator(&db);

        let mut a = request(&[(rice.id, 1)]);
        a.customer_id = Some(77);
        let mut b = request(&[(rice.id, 1)]);
        b.customer_id = Some(76);

        let err = coord.create_batch(&[a, b], staff).await.unwrap_err();
        match err {
            CheckoutError::Core(CoreError::CustomersNotFound(ids)) => assert_eq!(ids, vec![76, 77]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(voucher_rows(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_customer_is_embedded() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 100, 10).await;
        let customer = db
            .customers()
            .insert(
                &NewCustomer { name: "Hla".into(), phone: None, email: None },
                Utc::now(),
            )
            .await
            .unwrap();
        let (coord, _worker) = coordinator(&db);

        let mut req = request(&[(rice.id, 1)]);
        req.customer_id = Some(customer.id);
        req.delivery_address = Some("12 Bogyoke Rd".into());

        let created = coord.create_batch(&[req], staff).await.unwrap();
        assert_eq!(created[0].customer.as_ref().map(|c| c.id), Some(customer.id));
        assert_eq!(created[0].voucher.delivery_address.as_deref(), Some("12 Bogyoke Rd"));
    }

    #[tokio::test]
    async fn test_invalid_batch_touches_nothing() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 100, 10).await;
        let (coord, _worker) = coordinator(&db);

        for bad in [
            vec![request(&[(rice.id, 0)])],
            vec![request(&[(rice.id, 1)]), request(&[])],
            vec![],
        ] {
            let err = coord.create_batch(&bad, staff).await.unwrap_err();
            assert!(matches!(err, CheckoutError::Core(CoreError::Validation(_))), "{err:?}");
        }
        assert_eq!(voucher_rows(&db).await, (0, 0));
        assert_eq!(quantity(&db, rice.id).await, 10);
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_price_change() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 1000, 10).await;
        let (coord, _worker) = coordinator(&db);

        let created = coord.create_batch(&[request(&[(rice.id, 2)])], staff).await.unwrap();
        db.products()
            .update(rice.id, &product_input("rice", 2500, 8))
            .await
            .unwrap();

        let stored = db.vouchers().get_by_id(created[0].voucher.id).await.unwrap();
        assert_eq!(stored.items[0].price_at_sale_cents, 1000);
        assert_eq!(stored.items[0].subtotal_cents, 2000);
        assert_eq!(stored.voucher.subtotal_cents, 2000);
        assert_eq!(stored.items[0].total_quantity_sold, 2);
    }

    #[tokio::test]
    async fn test_active_discount_is_frozen_into_line() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let now = Utc::now();
        let mut soap = product_input("soap", 1000, 5);
        soap.discount_percent_bps = 2500;
        soap.discount_start = Some(now - Duration::hours(1));
        soap.discount_end = Some(now + Duration::hours(1));
        let soap = db.products().insert(&soap, now).await.unwrap();
        let (coord, _worker) = coordinator(&db);

        let created = coord.create_batch(&[request(&[(soap.id, 2)])], staff).await.unwrap();
        assert_eq!(created[0].items[0].price_at_sale_cents, 750);
        assert_eq!(created[0].voucher.subtotal_cents, 1500);
    }

    #[tokio::test]
    async fn test_discounts_clamp_final_amount_to_zero() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 1000, 10).await;
        let (coord, _worker) = coordinator(&db);

        let mut req = request(&[(rice.id, 1)]);
        req.discount_percentage_bps = Some(1000);
        req.discount_amount_cents = Some(5000);

        let created = coord.create_batch(&[req], staff).await.unwrap();
        let v = &created[0].voucher;
        assert_eq!(v.subtotal_cents, 1000);
        assert_eq!(v.total_discount_cents, 5100);
        assert_eq!(v.total_amount_cents, 0);
    }

    #[tokio::test]
    async fn test_voucher_numbers_are_unique() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 100, 10).await;
        let (coord, _worker) = coordinator(&db);

        let created = coord
            .create_batch(
                &[request(&[(rice.id, 1)]), request(&[(rice.id, 1)]), request(&[(rice.id, 1)])],
                staff,
            )
            .await
            .unwrap();

        let mut numbers: Vec<&str> = created.iter().map(|d| d.voucher.voucher_number.as_str()).collect();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), 3);
        assert!(numbers.iter().all(|n| n.starts_with("INV-")));
    }

    #[tokio::test]
    async fn test_last_sold_at_uses_batch_timestamp() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 100, 10).await;
        let tea = seed_product(&db, "tea", 100, 10).await;
        let (coord, _worker) = coordinator(&db);

        let created = coord
            .create_batch(&[request(&[(rice.id, 1)]), request(&[(tea.id, 1)])], staff)
            .await
            .unwrap();

        let stamped = created[0].voucher.created_at;
        assert_eq!(created[1].voucher.created_at, stamped);
        assert_eq!(db.products().get_by_id(rice.id).await.unwrap().last_sold_at, Some(stamped));
        assert_eq!(db.products().get_by_id(tea.id).await.unwrap().last_sold_at, Some(stamped));
    }

    #[tokio::test]
    async fn test_audit_entry_per_voucher() {
        let db = memory_db().await;
        let staff = seed_staff(&db).await;
        let rice = seed_product(&db, "rice", 100, 10).await;
        let (coord, worker) = coordinator(&db);
        let handle = tokio::spawn(worker.run());

        let created = coord
            .create_batch(&[request(&[(rice.id, 1)]), request(&[(rice.id, 2)])], staff)
            .await
            .unwrap();
        drop(coord);
        handle.await.unwrap();

        for detail in &created {
            let rows = db.audit_logs().list_for_record("vouchers", detail.voucher.id).await.unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].action, "CREATE_VOUCHER");
            assert_eq!(rows[0].user_id, staff);
        }
    }

    #[tokio::test]
    async fn test_concurrent_batches_cannot_oversell() {
        let (db, path) = file_db(4).await;
        let staff = seed_staff(&db).await;
        let lamp = seed_product(&db, "lamp", 900, 5).await;
        let (coord, _worker) = coordinator(&db);

        let a = coord.clone();
        let b = coord.clone();
        let batch = vec![request(&[(lamp.id, 3)])];
        let batch_b = batch.clone();

        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.create_batch(&batch, staff).await }),
            tokio::spawn(async move { b.create_batch(&batch_b, staff).await }),
        );
        let results = [ra.unwrap(), rb.unwrap()];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let short = results
            .iter()
            .filter(|r| matches!(r, Err(CheckoutError::Core(CoreError::InsufficientStock { .. }))))
            .count();
        assert_eq!((successes, short), (1, 1));
        assert_eq!(quantity(&db, lamp.id).await, 2);

        drop(coord);
        remove_file_db(db, path).await;
    }

    #[tokio::test]
    async fn test_lock_wait_expiry_aborts_with_conflict() {
        let (db, path) = file_db_with(2, std::time::Duration::from_millis(200)).await;
        let staff = seed_staff(&db).await;
        let kettle = seed_product(&db, "kettle", 2500, 5).await;
        let (coord, _worker) = coordinator(&db);

        // Another writer holds the lock for the whole attempt.
        let mut writer = db.pool().begin().await.unwrap();
        sqlx::query("UPDATE products SET quantity = quantity WHERE id = ?")
            .bind(kettle.id)
            .execute(&mut *writer)
            .await
            .unwrap();

        let started = std::time::Instant::now();
        let result = coord.create_batch(&[request(&[(kettle.id, 1)])], staff).await;
        let elapsed = started.elapsed();

        assert!(
            matches!(result, Err(CheckoutError::Db(DbError::Conflict(_)))),
            "expected a conflict, got {result:?}"
        );
        assert!(elapsed < std::time::Duration::from_secs(3), "waited {elapsed:?}");

        writer.rollback().await.unwrap();
        assert_eq!(voucher_rows(&db).await, (0, 0));
        assert_eq!(quantity(&db, kettle.id).await, 5);

        // Once the lock is released the same batch goes through.
        assert!(coord.create_batch(&[request(&[(kettle.id, 1)])], staff).await.is_ok());
        assert_eq!(quantity(&db, kettle.id).await, 4);

        drop(coord);
        remove_file_db(db, path).await;
    }
}
