//! # Audit Log Repository
//!
//! Append-only storage behind [`AuditWorker`](crate::audit::AuditWorker).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use smartpos_core::audit::AuditEntry;

/// A stored audit row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AuditLogRow {
    pub id: i64,
    pub action: String,
    pub table_name: String,
    pub record_id: i64,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Appends one entry. JSON values are stored as text.
    pub async fn insert(&self, entry: &AuditEntry) -> DbResult<i64> {
        let old_value = entry
            .old_value
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DbError::Internal(e.to_string()))?;
        let new_value = entry
            .new_value
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO audit_logs (action, table_name, record_id, old_value, new_value, user_id, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.action.as_str())
        .bind(entry.table_name)
        .bind(entry.record_id)
        .bind(old_value)
        .bind(new_value)
        .bind(entry.user_id)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// History of one record, oldest first.
    pub async fn list_for_record(&self, table_name: &str, record_id: i64) -> DbResult<Vec<AuditLogRow>> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            "SELECT id, action, table_name, record_id, old_value, new_value, user_id, timestamp
             FROM audit_logs WHERE table_name = ? AND record_id = ? ORDER BY id",
        )
        .bind(table_name)
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
