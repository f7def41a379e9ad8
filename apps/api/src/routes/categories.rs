//! Category routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;
use smartpos_core::audit::{AuditAction, AuditEntry, CategorySnapshot};
use smartpos_core::validation::normalize_category_name;
use smartpos_core::{Category, CategoryInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route("/categories/{id}", put(rename).delete(remove))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let name = normalize_category_name(&payload.name)?;
    let category = state.db.categories().insert(&name).await?;

    state.audit.record(AuditEntry::created(
        AuditAction::CreateCategory,
        &CategorySnapshot::from(&category),
        user.id(),
        Utc::now(),
    ));

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list(State(state): State<AppState>, _user: CurrentUser) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

pub async fn rename(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryInput>,
) -> ApiResult<Json<Category>> {
    let name = normalize_category_name(&payload.name)?;
    let (before, after) = state.db.categories().rename(id, &name).await?;

    state.audit.record(AuditEntry::updated(
        AuditAction::UpdateCategory,
        &CategorySnapshot::from(&before),
        &CategorySnapshot::from(&after),
        user.id(),
        Utc::now(),
    ));

    Ok(Json(after))
}

/// Deletes an empty category. 400 while products are filed under it.
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let removed = state.db.categories().delete(id).await?;

    state.audit.record(AuditEntry::deleted(
        AuditAction::DeleteCategory,
        &CategorySnapshot::from(&removed),
        user.id(),
        Utc::now(),
    ));

    Ok(StatusCode::NO_CONTENT)
}
