//! # Product Repository
//!
//! Database operations for stock items.
//!
//! ## Listing Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How the stock listing is built                       │
//! │                                                                         │
//! │  products p                                                             │
//! │    LEFT JOIN categories c          → category_name                      │
//! │    LEFT JOIN (SUM(quantity) per product FROM voucher_items) s           │
//! │                                    → total_sold (0 when never sold)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE  filters pushed one by one with QueryBuilder (all bound)         │
//! │  ORDER BY whitelisted column, p.id as tiebreaker                        │
//! │  LIMIT / OFFSET                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StockView::new(row, at) → is_on_sale, sale_price_cents                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `is_on_sale` and `sale_price_cents` are computed in Rust with the same
//! pricing engine the coordinator uses, so a listing never disagrees with
//! what a voucher would charge at the same instant.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use smartpos_core::{Page, PageRequest, Product, ProductInput, SortOrder, StockQuery, StockView};

/// Columns a client may sort the stock listing by.
pub const STOCK_SORT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "price_cents",
    "cost_price_cents",
    "quantity",
    "arrival_date",
    "last_sold_at",
    "created_at",
    "total_sold",
];

pub const DEFAULT_STOCK_SORT: &str = "id";

pub(crate) const PRODUCT_COLUMNS: &str = "p.id AS id, p.name AS name, p.description AS description, \
    p.category_id AS category_id, p.price_cents AS price_cents, \
    p.cost_price_cents AS cost_price_cents, p.quantity AS quantity, \
    p.discount_percent_bps AS discount_percent_bps, p.discount_start AS discount_start, \
    p.discount_end AS discount_end, p.arrival_date AS arrival_date, \
    p.last_sold_at AS last_sold_at, p.created_at AS created_at";

const STOCK_FROM: &str = " FROM products p \
    LEFT JOIN categories c ON c.id = p.category_id \
    LEFT JOIN (SELECT product_id, SUM(quantity) AS total_sold \
               FROM voucher_items GROUP BY product_id) s ON s.product_id = p.id";

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    #[sqlx(flatten)]
    product: Product,
    category_name: Option<String>,
    total_sold: i64,
}

impl StockRow {
    fn into_view(self, at: DateTime<Utc>) -> StockView {
        StockView::new(self.product, self.category_name, self.total_sold, at)
    }
}

fn stock_select() -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(PRODUCT_COLUMNS)
        .push(", c.name AS category_name, COALESCE(s.total_sold, 0) AS total_sold")
        .push(STOCK_FROM);
    qb
}

fn push_filters(qb: &mut QueryBuilder<'static, Sqlite>, q: &StockQuery) {
    qb.push(" WHERE 1 = 1");

    if let Some(name) = q.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        qb.push(" AND p.name LIKE ")
            .push_bind(format!("%{}%", name.to_lowercase()));
    }
    if let Some(category_id) = q.category_id {
        qb.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(v) = q.sell_price_gt {
        qb.push(" AND p.price_cents > ").push_bind(v);
    }
    if let Some(v) = q.sell_price_lt {
        qb.push(" AND p.price_cents < ").push_bind(v);
    }
    if let Some(v) = q.buy_price_gt {
        qb.push(" AND p.cost_price_cents > ").push_bind(v);
    }
    if let Some(v) = q.buy_price_lt {
        qb.push(" AND p.cost_price_cents < ").push_bind(v);
    }
    if let Some(v) = q.quantity_gt {
        qb.push(" AND p.quantity > ").push_bind(v);
    }
    if let Some(v) = q.quantity_lt {
        qb.push(" AND p.quantity < ").push_bind(v);
    }
    if let Some(v) = q.total_sold_gt {
        qb.push(" AND COALESCE(s.total_sold, 0) > ").push_bind(v);
    }
    if let Some(v) = q.total_sold_lt {
        qb.push(" AND COALESCE(s.total_sold, 0) < ").push_bind(v);
    }
    if let Some(day) = q.arrival_date_eq {
        qb.push(" AND date(p.arrival_date) = ")
            .push_bind(day.format("%Y-%m-%d").to_string());
    }
    if let Some(day) = q.arrival_date_start {
        qb.push(" AND date(p.arrival_date) >= ")
            .push_bind(day.format("%Y-%m-%d").to_string());
    }
    if let Some(day) = q.arrival_date_end {
        qb.push(" AND date(p.arrival_date) <= ")
            .push_bind(day.format("%Y-%m-%d").to_string());
    }
}

fn sort_expression(column: &str) -> String {
    if column == "total_sold" {
        "total_sold".to_string()
    } else {
        format!("p.{column}")
    }
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Returns one page of the stock listing.
    ///
    /// ## Arguments
    /// * `filters` - Only the filter fields are read; paging and sort come
    ///   resolved in `page` and `sort`
    /// * `sort` - A column from [`STOCK_SORT_COLUMNS`] and a direction
    /// * `at` - Instant the discount windows are evaluated at
    pub async fn list(
        &self,
        filters: &StockQuery,
        page: PageRequest,
        sort: (&str, SortOrder),
        at: DateTime<Utc>,
    ) -> DbResult<Page<StockView>> {
        let (column, order) = sort;
        if !STOCK_SORT_COLUMNS.contains(&column) {
            return Err(DbError::QueryFailed(format!("unsupported sort column {column}")));
        }

        debug!(page = page.page, size = page.size, sort = column, "Listing stock");

        let mut count = QueryBuilder::new("SELECT COUNT(*)");
        count.push(STOCK_FROM);
        push_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = stock_select();
        push_filters(&mut qb, filters);
        qb.push(format!(
            " ORDER BY {} {dir}, p.id {dir}",
            sort_expression(column),
            dir = order.as_sql()
        ));
        qb.push(" LIMIT ").push_bind(page.size);
        qb.push(" OFFSET ").push_bind(page.offset());

        let rows: Vec<StockRow> = qb.build_query_as::<StockRow>().fetch_all(&self.pool).await?;

        Ok(Page {
            items: rows.into_iter().map(|r| r.into_view(at)).collect(),
            total,
            page: page.page,
            size: page.size,
        })
    }

    /// Gets one product with its listing fields.
    pub async fn get_view(&self, id: i64, at: DateTime<Utc>) -> DbResult<StockView> {
        let mut qb = stock_select();
        qb.push(" WHERE p.id = ").push_bind(id);

        let row: Option<StockRow> = qb.build_query_as::<StockRow>().fetch_optional(&self.pool).await?;
        row.map(|r| r.into_view(at))
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    async fn name_taken(&self, name: &str, excluding: Option<i64>) -> DbResult<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE name = ? AND id IS NOT ?)")
                .bind(name)
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    /// Inserts a product from an already validated payload.
    ///
    /// ## Errors
    /// `UniqueViolation` when the name is taken.
    pub async fn insert(&self, input: &ProductInput, now: DateTime<Utc>) -> DbResult<Product> {
        if self.name_taken(&input.name, None).await? {
            return Err(DbError::duplicate("product name", input.name.clone()));
        }

        let arrival_date = input.arrival_date.unwrap_or(now);

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, description, category_id, price_cents, cost_price_cents, quantity,
                discount_percent_bps, discount_start, discount_end, arrival_date, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price_cents)
        .bind(input.cost_price_cents)
        .bind(input.quantity)
        .bind(input.discount_percent_bps)
        .bind(input.discount_start)
        .bind(input.discount_end)
        .bind(arrival_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, name = %input.name, quantity = input.quantity, "Product created");

        self.get_by_id(id).await
    }

    /// Replaces a product's editable fields. Returns `(before, after)`.
    ///
    /// `arrival_date` is kept when the payload omits it.
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<(Product, Product)> {
        let before = self.get_by_id(id).await?;

        if self.name_taken(&input.name, Some(id)).await? {
            return Err(DbError::duplicate("product name", input.name.clone()));
        }

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?, description = ?, category_id = ?, price_cents = ?,
                cost_price_cents = ?, quantity = ?, discount_percent_bps = ?,
                discount_start = ?, discount_end = ?, arrival_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(input.price_cents)
        .bind(input.cost_price_cents)
        .bind(input.quantity)
        .bind(input.discount_percent_bps)
        .bind(input.discount_start)
        .bind(input.discount_end)
        .bind(input.arrival_date.unwrap_or(before.arrival_date))
        .bind(id)
        .execute(&self.pool)
        .await?;

        debug!(id, "Product updated");

        let after = self.get_by_id(id).await?;
        Ok((before, after))
    }

    /// Deletes a product that was never sold. Returns the removed row.
    ///
    /// ## Errors
    /// `InUse` when any voucher item references it. Setting quantity to 0
    /// is the way to retire a sold product.
    pub async fn delete(&self, id: i64) -> DbResult<Product> {
        let product = self.get_by_id(id).await?;

        let sold: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM voucher_items WHERE product_id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if sold {
            return Err(DbError::in_use(format!("Product {}", product.name), "vouchers"));
        }

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id, "Product deleted");
        Ok(product)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
