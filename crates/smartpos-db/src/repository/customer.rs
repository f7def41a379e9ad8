//! # Customer Repository

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use smartpos_core::{Customer, CustomerUpdate, NewCustomer, Page, PageRequest};

pub(crate) const CUSTOMER_COLUMNS: &str = "id, name, phone, email, points, created_at";

fn push_search(qb: &mut QueryBuilder<'static, Sqlite>, search: Option<&str>) {
    if let Some(term) = search {
        let pattern = format!("%{term}%");
        qb.push(" WHERE (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR phone LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Returns one page of customers, newest first.
    ///
    /// `search` must already be validated (trimmed, at least two
    /// characters); it matches name or phone substrings.
    pub async fn list(&self, search: Option<&str>, page: PageRequest) -> DbResult<Page<Customer>> {
        debug!(search = ?search, page = page.page, "Listing customers");

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM customers");
        push_search(&mut count, search);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(format!("SELECT {CUSTOMER_COLUMNS} FROM customers"));
        push_search(&mut qb, search);
        qb.push(" ORDER BY id DESC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = qb.build_query_as::<Customer>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>(&format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    async fn phone_taken(&self, phone: &str, excluding: Option<i64>) -> DbResult<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customers WHERE phone = ? AND id IS NOT ?)")
                .bind(phone)
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?;
        Ok(taken)
    }

    /// Creates a customer with zero points.
    pub async fn insert(&self, customer: &NewCustomer, now: DateTime<Utc>) -> DbResult<Customer> {
        if let Some(phone) = customer.phone.as_deref() {
            if self.phone_taken(phone, None).await? {
                return Err(DbError::duplicate("phone", phone));
            }
        }

        let result = sqlx::query(
            "INSERT INTO customers (name, phone, email, points, created_at) VALUES (?, ?, ?, 0, ?)",
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, "Customer created");

        Ok(Customer {
            id,
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            points: 0,
            created_at: now,
        })
    }

    /// Applies a partial update. Returns `(before, after)`.
    pub async fn update(&self, id: i64, changes: &CustomerUpdate) -> DbResult<(Customer, Customer)> {
        let before = self.get_by_id(id).await?;

        let after = Customer {
            id,
            name: changes.name.clone().unwrap_or_else(|| before.name.clone()),
            phone: changes.phone.clone().or_else(|| before.phone.clone()),
            email: changes.email.clone().or_else(|| before.email.clone()),
            points: changes.points.unwrap_or(before.points),
            created_at: before.created_at,
        };

        if let Some(phone) = after.phone.as_deref() {
            if self.phone_taken(phone, Some(id)).await? {
                return Err(DbError::duplicate("phone", phone));
            }
        }

        sqlx::query("UPDATE customers SET name = ?, phone = ?, email = ?, points = ? WHERE id = ?")
            .bind(&after.name)
            .bind(&after.phone)
            .bind(&after.email)
            .bind(after.points)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id, "Customer updated");
        Ok((before, after))
    }

    /// Deletes a customer. Their vouchers keep existing with no customer.
    pub async fn delete(&self, id: i64) -> DbResult<Customer> {
        let customer = self.get_by_id(id).await?;

        sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id, "Customer deleted");
        Ok(customer)
    }
}
