//! HTTP routes.
//!
//! | Path | Methods | Auth |
//! |------|---------|------|
//! | /login | POST | none |
//! | /users/me | GET | bearer |
//! | /stock, /stock/{id} | POST GET / GET PUT DELETE | bearer, PUT/DELETE manager |
//! | /categories, /categories/{id} | POST GET / PUT DELETE | bearer |
//! | /customers, /customers/{id} | POST GET / GET PUT DELETE | bearer |
//! | /vouchers, /vouchers/{id} | POST GET / GET | bearer |
//! | /dashboard/stats | GET | bearer |
//! | /health | GET | none |
//!
//! Authentication is enforced per handler through the
//! [`CurrentUser`](crate::auth::CurrentUser) extractor.

pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod stock;
pub mod vouchers;

use axum::Router;

use crate::AppState;

/// Assembles every route over the shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(stock::router())
        .merge(categories::router())
        .merge(customers::router())
        .merge(vouchers::router())
        .merge(dashboard::router())
        .with_state(state)
}
