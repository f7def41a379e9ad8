//! # Dashboard Repository
//!
//! Shop-wide counters for the landing screen.

use sqlx::SqlitePool;

use crate::error::DbResult;
use smartpos_core::DashboardStats;

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Revenue, voucher count, customer count and units on the shelf.
    pub async fn stats(&self) -> DbResult<DashboardStats> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COALESCE(SUM(total_amount_cents), 0) FROM vouchers) AS total_revenue_cents,
                (SELECT COUNT(*) FROM vouchers)                             AS vouchers_issued,
                (SELECT COUNT(*) FROM customers)                            AS new_customers,
                (SELECT COALESCE(SUM(quantity), 0) FROM products)           AS products_in_stock
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
