//! # User Repository
//!
//! Staff accounts. Password hashing happens in the API crate; this layer
//! only stores and returns the PHC string.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use smartpos_core::{Role, User};

const USER_COLUMNS: &str = "id, username, password_hash, full_name, role, is_active, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks a user up by login name.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        debug!(username = %username, "Looking up user");

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Inserts an active user.
    ///
    /// ## Errors
    /// `UniqueViolation` when the username is taken.
    pub async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> DbResult<User> {
        if self.find_by_username(username).await?.is_some() {
            return Err(DbError::duplicate("username", username));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, full_name, role, is_active, created_at)
             VALUES (?, ?, ?, ?, 1, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(username = %username, role = role.as_str(), "User created");

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            full_name: full_name.map(str::to_string),
            role,
            is_active: true,
            created_at: now,
        })
    }

    /// Counts active managers.
    pub async fn count_managers(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'manager' AND is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
