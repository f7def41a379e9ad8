//! # Repository Module
//!
//! One repository per table family. Each is a cheap clone over the pool,
//! handed out by [`Database`](crate::Database).
//!
//! ```text
//! Database
//! ├── users()       → UserRepository       login lookup, bootstrap
//! ├── categories()  → CategoryRepository   CRUD, delete guard
//! ├── products()    → ProductRepository    stock CRUD, filtered listing
//! ├── customers()   → CustomerRepository   CRUD, search
//! ├── vouchers()    → VoucherRepository    read projections
//! ├── dashboard()   → DashboardRepository  shop-wide counters
//! └── audit_logs()  → AuditLogRepository   append-only trail
//! ```
//!
//! Voucher writes do not live here. They go through the
//! [`BatchCoordinator`](crate::BatchCoordinator) so stock and vouchers
//! change in one transaction.

pub mod audit;
pub mod category;
pub mod customer;
pub mod dashboard;
pub mod product;
pub mod user;
pub mod voucher;
