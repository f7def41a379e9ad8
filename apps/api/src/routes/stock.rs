//! Inventory routes.
//!
//! | Path | Method | Role |
//! |------|--------|------|
//! | /stock | POST | any |
//! | /stock | GET | any |
//! | /stock/{id} | GET | any |
//! | /stock/{id} | PUT | manager |
//! | /stock/{id} | DELETE | manager |

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use smartpos_core::audit::{AuditAction, AuditEntry, ProductSnapshot};
use smartpos_core::validation::{resolve_page, resolve_sort, validate_product_input};
use smartpos_core::{Page, ProductInput, StockQuery, StockView};
use smartpos_db::repository::product::{DEFAULT_STOCK_SORT, STOCK_SORT_COLUMNS};
use smartpos_db::DbError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stock", get(list).post(create))
        .route("/stock/{id}", get(get_one).put(update).delete(remove))
}

/// Rejects a payload filed under a category that does not exist.
async fn check_category(state: &AppState, input: &ProductInput) -> ApiResult<()> {
    let Some(category_id) = input.category_id else {
        return Ok(());
    };
    match state.db.categories().get_by_id(category_id).await {
        Ok(_) => Ok(()),
        Err(DbError::NotFound { .. }) => Err(ApiError::Validation(format!(
            "category_id {category_id} does not exist"
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<StockView>)> {
    let input = validate_product_input(&payload)?;
    check_category(&state, &input).await?;

    let now = Utc::now();
    let product = state.db.products().insert(&input, now).await?;

    state.audit.record(AuditEntry::created(
        AuditAction::CreateStock,
        &ProductSnapshot::from(&product),
        user.id(),
        now,
    ));

    let view = state.db.products().get_view(product.id, now).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Filtered, sorted, paginated inventory.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<StockQuery>,
) -> ApiResult<Json<Page<StockView>>> {
    let page = resolve_page(query.page, query.limit)?;
    let sort = resolve_sort(
        query.sort_by.as_deref(),
        query.sort_order,
        STOCK_SORT_COLUMNS,
        DEFAULT_STOCK_SORT,
    )?;

    let listing = state.db.products().list(&query, page, sort, Utc::now()).await?;
    Ok(Json(listing))
}

pub async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<StockView>> {
    Ok(Json(state.db.products().get_view(id, Utc::now()).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ProductInput>,
) -> ApiResult<Json<StockView>> {
    user.require_manager()?;

    let input = validate_product_input(&payload)?;
    check_category(&state, &input).await?;

    let (before, after) = state.db.products().update(id, &input).await?;

    let now = Utc::now();
    state.audit.record(AuditEntry::updated(
        AuditAction::UpdateStock,
        &ProductSnapshot::from(&before),
        &ProductSnapshot::from(&after),
        user.id(),
        now,
    ));

    Ok(Json(state.db.products().get_view(id, now).await?))
}

/// Removes a product that never appeared on a voucher.
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    user.require_manager()?;

    let removed = state.db.products().delete(id).await?;

    state.audit.record(AuditEntry::deleted(
        AuditAction::DeleteStock,
        &ProductSnapshot::from(&removed),
        user.id(),
        Utc::now(),
    ));

    Ok(StatusCode::NO_CONTENT)
}
