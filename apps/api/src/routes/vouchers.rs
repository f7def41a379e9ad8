//! Voucher routes.
//!
//! `POST /vouchers` hands the whole batch to the
//! [`BatchCoordinator`](smartpos_db::BatchCoordinator): either every voucher
//! is stored and stock is reduced, or nothing changes.
//!
//! ```json
//! { "vouchers": [ { "items": [ { "product_id": 1, "quantity": 2 } ], "customer_id": 4 } ] }
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;
use smartpos_core::validation::{resolve_page, resolve_sort};
use smartpos_core::{CreateVouchersRequest, Page, VoucherDetail, VoucherQuery};
use smartpos_db::repository::voucher::{DEFAULT_VOUCHER_SORT, VOUCHER_SORT_COLUMNS};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vouchers", get(list).post(create))
        .route("/vouchers/{id}", get(get_one))
}

/// Records a batch of sales. Responds with the vouchers in request order.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateVouchersRequest>,
) -> ApiResult<(StatusCode, Json<Vec<VoucherDetail>>)> {
    let vouchers = state.checkout.create_batch(&payload.vouchers, user.id()).await?;

    info!(
        staff_id = user.id(),
        count = vouchers.len(),
        "Voucher batch recorded"
    );

    Ok((StatusCode::CREATED, Json(vouchers)))
}

pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<VoucherQuery>,
) -> ApiResult<Json<Page<VoucherDetail>>> {
    let page = resolve_page(query.page, query.limit)?;
    let sort = resolve_sort(
        query.sort_by.as_deref(),
        query.sort_order,
        VOUCHER_SORT_COLUMNS,
        DEFAULT_VOUCHER_SORT,
    )?;

    Ok(Json(state.db.vouchers().list(&query, page, sort).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<VoucherDetail>> {
    Ok(Json(state.db.vouchers().get_by_id(id).await?))
}
