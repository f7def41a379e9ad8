//! # Smart POS API
//!
//! HTTP server for tills and the back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Smart POS API                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐ │
//! │  │  auth          │  │  routes        │  │  smartpos-db               │ │
//! │  │                │  │                │  │                            │ │
//! │  │ • /login       │  │ • /stock       │  │ • repositories             │ │
//! │  │ • CurrentUser  │  │ • /categories  │  │ • BatchCoordinator         │ │
//! │  │ • role gates   │  │ • /customers   │  │   (POST /vouchers)         │ │
//! │  │                │  │ • /vouchers    │  │ • AuditRecorder ──► worker │ │
//! │  │                │  │ • /dashboard   │  │                            │ │
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘ │
//! │                                                                         │
//! │  bootstrap: connect with backoff ──► migrate ──► first manager          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Environment variables use the `SMARTPOS_`
//! prefix, e.g. `SMARTPOS_JWT_SECRET`, `SMARTPOS_DATABASE_PATH`.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod routes;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use smartpos_db::{AuditRecorder, BatchCoordinator, Database};

// Re-exports
pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::build_router;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub audit: AuditRecorder,
    pub checkout: BatchCoordinator,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, audit: AuditRecorder, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_access_lifetime_secs);
        AppState {
            checkout: db.coordinator(audit.clone()),
            db,
            audit,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}
