//! Process startup: reach the database, then make sure someone can log in.
//!
//! ```text
//! connect ──► Database::new (migrate) ──┬── ok ──► ensure_admin
//!                 ▲                     │
//!                 └── backoff (transient)┘
//!                     migration failures are permanent
//! ```

use std::time::Duration;

use backoff::ExponentialBackoff;
use tracing::{info, warn};

use crate::auth::hash_password;
use crate::config::ApiConfig;
use crate::error::ApiResult;
use smartpos_core::{Role, User};
use smartpos_db::{Database, DbConfig, DbError, DbResult};

/// Builds the pool settings from the server configuration.
pub fn db_config(config: &ApiConfig) -> DbConfig {
    DbConfig::new(&config.database_path)
        .max_connections(config.db_max_connections)
        .busy_timeout(Duration::from_millis(config.db_busy_timeout_ms))
}

/// Opens the database and applies migrations, retrying with exponential
/// backoff until `startup_max_elapsed_secs` runs out.
pub async fn connect(config: &ApiConfig) -> DbResult<Database> {
    let policy = ExponentialBackoff {
        max_elapsed_time: Some(Duration::from_secs(config.startup_max_elapsed_secs)),
        ..Default::default()
    };

    backoff::future::retry_notify(
        policy,
        || async {
            Database::new(db_config(config)).await.map_err(|e| match e {
                DbError::MigrationFailed(_) => backoff::Error::permanent(e),
                other => backoff::Error::transient(other),
            })
        },
        |e: DbError, wait: Duration| {
            warn!(error = %e, retry_in_ms = wait.as_millis() as u64, "Database not ready");
        },
    )
    .await
}

/// Creates the configured manager account when no active manager exists.
///
/// Returns the new account, or `None` when nothing had to be done.
pub async fn ensure_admin(db: &Database, config: &ApiConfig) -> ApiResult<Option<User>> {
    let users = db.users();

    if users.count_managers().await? > 0 {
        return Ok(None);
    }
    if users.find_by_username(&config.admin_username).await?.is_some() {
        warn!(
            username = %config.admin_username,
            "No active manager, but the admin username is taken; not creating one"
        );
        return Ok(None);
    }

    let hash = hash_password(&config.admin_password)?;
    let admin = users
        .insert(&config.admin_username, &hash, Some("System Manager"), Role::Manager)
        .await?;

    info!(username = %admin.username, "Initial manager account created");
    Ok(Some(admin))
}
