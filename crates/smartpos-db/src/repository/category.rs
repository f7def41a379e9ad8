//! # Category Repository
//!
//! Names arrive already normalized (trimmed, uppercased) from
//! `smartpos_core::validation::normalize_category_name`.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use smartpos_core::Category;

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists every category, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn name_taken(&self, name: &str, excluding: Option<i64>) -> DbResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE name = ? AND id IS NOT ?)",
        )
        .bind(name)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Creates a category.
    ///
    /// ## Errors
    /// `UniqueViolation` when the name is taken.
    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        if self.name_taken(name, None).await? {
            return Err(DbError::duplicate("category name", name));
        }

        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        info!(name = %name, "Category created");

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Renames a category. Returns `(before, after)`.
    pub async fn rename(&self, id: i64, name: &str) -> DbResult<(Category, Category)> {
        let before = self.get_by_id(id).await?;

        if self.name_taken(name, Some(id)).await? {
            return Err(DbError::duplicate("category name", name));
        }

        sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id, name = %name, "Category renamed");

        let after = Category {
            id,
            name: name.to_string(),
        };
        Ok((before, after))
    }

    /// Deletes a category nothing references. Returns the removed row.
    ///
    /// ## Errors
    /// `InUse` while any product is filed under it.
    pub async fn delete(&self, id: i64) -> DbResult<Category> {
        let category = self.get_by_id(id).await?;

        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE category_id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if referenced {
            return Err(DbError::in_use(format!("Category {}", category.name), "products"));
        }

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id, "Category deleted");
        Ok(category)
    }
}
