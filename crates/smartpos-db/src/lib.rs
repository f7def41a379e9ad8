//! # smartpos-db: Database Layer for Smart POS
//!
//! SQLite storage, the batch transaction coordinator and the audit
//! recorder. Uses sqlx for async access with embedded migrations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Smart POS Data Flow                              │
//! │                                                                         │
//! │  axum handler (POST /vouchers)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   smartpos-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐   │    │
//! │  │  │  Database    │  │ BatchCoordinator │  │  Repositories    │   │    │
//! │  │  │  (pool.rs)   │  │ (coordinator.rs) │  │  stock, category │   │    │
//! │  │  │  SqlitePool  │◄─│  lock → reserve  │  │  customer, user  │   │    │
//! │  │  │  WAL, FKs    │  │  → price → commit│  │  voucher, audit  │   │    │
//! │  │  └──────────────┘  └────────┬─────────┘  └──────────────────┘   │    │
//! │  │                             │ record()                          │    │
//! │  │                             ▼                                   │    │
//! │  │                   AuditRecorder ──mpsc──► AuditWorker           │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (smartpos.db)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`coordinator`] - Atomic multi-voucher checkout
//! - [`audit`] - Background audit trail
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smartpos_db::{AuditRecorder, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("smartpos.db")).await?;
//! let (audit, worker) = AuditRecorder::channel(1024, db.audit_logs());
//! tokio::spawn(worker.run());
//!
//! let vouchers = db.coordinator(audit).create_batch(&requests, staff_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod coordinator;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::{AuditRecorder, AuditWorker};
pub use coordinator::{BatchCoordinator, CheckoutError};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditLogRepository;
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::dashboard::DashboardRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
pub use repository::voucher::VoucherRepository;
