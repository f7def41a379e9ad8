//! Shared fixtures for this crate's tests.

use chrono::Utc;
use smartpos_core::{Product, ProductInput, Role};

use crate::pool::{Database, DbConfig};

pub(crate) fn product_input(name: &str, price_cents: i64, quantity: i64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: None,
        category_id: None,
        price_cents,
        cost_price_cents: Some(price_cents / 2),
        quantity,
        discount_percent_bps: 0,
        discount_start: None,
        discount_end: None,
        arrival_date: None,
    }
}

pub(crate) async fn seed_product(db: &Database, name: &str, price_cents: i64, quantity: i64) -> Product {
    db.products()
        .insert(&product_input(name, price_cents, quantity), Utc::now())
        .await
        .unwrap()
}

/// Inserts a staff user and returns its id.
pub(crate) async fn seed_staff(db: &Database) -> i64 {
    db.users()
        .insert("cashier", "not-a-real-hash", None, Role::Staff)
        .await
        .unwrap()
        .id
}

pub(crate) async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A file-backed database so several pooled connections see the same data.
pub(crate) async fn file_db(max_connections: u32) -> (Database, std::path::PathBuf) {
    file_db_with(max_connections, std::time::Duration::from_secs(5)).await
}

/// Like [`file_db`] with a custom lock wait bound.
pub(crate) async fn file_db_with(
    max_connections: u32,
    busy_timeout: std::time::Duration,
) -> (Database, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("smartpos-test-{}.db", uuid::Uuid::new_v4()));
    let config = DbConfig::new(&path)
        .max_connections(max_connections)
        .busy_timeout(busy_timeout);
    let db = Database::new(config).await.unwrap();
    (db, path)
}

/// Removes a database created by [`file_db`] along with its WAL files.
pub(crate) async fn remove_file_db(db: Database, path: std::path::PathBuf) {
    db.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}
