//! Back-office summary.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;
use smartpos_core::DashboardStats;

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(stats))
}

pub async fn stats(State(state): State<AppState>, _user: CurrentUser) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.db.dashboard().stats().await?))
}
