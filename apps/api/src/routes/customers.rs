//! Customer routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::AppState;
use smartpos_core::audit::{AuditAction, AuditEntry, CustomerSnapshot};
use smartpos_core::validation::{
    normalize_customer_name, normalize_optional, resolve_page, validate_non_negative, validate_search_term,
};
use smartpos_core::{Customer, CustomerQuery, CustomerUpdate, NewCustomer, Page};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list).post(create))
        .route("/customers/{id}", get(get_one).put(update).delete(remove))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = NewCustomer {
        name: normalize_customer_name(&payload.name)?,
        phone: normalize_optional(payload.phone.as_deref()),
        email: normalize_optional(payload.email.as_deref()),
    };

    let now = Utc::now();
    let created = state.db.customers().insert(&customer, now).await?;

    state.audit.record(AuditEntry::created(
        AuditAction::CreateCustomer,
        &CustomerSnapshot::from(&created),
        user.id(),
        now,
    ));

    Ok((StatusCode::CREATED, Json(created)))
}

/// Newest first. `search` matches a name or phone substring.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<CustomerQuery>,
) -> ApiResult<Json<Page<Customer>>> {
    let page = resolve_page(query.page, query.limit)?;
    let search = query.search.as_deref().map(validate_search_term).transpose()?;

    Ok(Json(state.db.customers().list(search.as_deref(), page).await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.db.customers().get_by_id(id).await?))
}

/// Partial update; absent or blank fields keep their value.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> ApiResult<Json<Customer>> {
    if let Some(points) = payload.points {
        validate_non_negative("points", points)?;
    }

    let changes = CustomerUpdate {
        name: payload.name.as_deref().map(normalize_customer_name).transpose()?,
        phone: normalize_optional(payload.phone.as_deref()),
        email: normalize_optional(payload.email.as_deref()),
        points: payload.points,
    };

    let (before, after) = state.db.customers().update(id, &changes).await?;

    state.audit.record(AuditEntry::updated(
        AuditAction::UpdateCustomer,
        &CustomerSnapshot::from(&before),
        &CustomerSnapshot::from(&after),
        user.id(),
        Utc::now(),
    ));

    Ok(Json(after))
}

pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let removed = state.db.customers().delete(id).await?;

    state.audit.record(AuditEntry::deleted(
        AuditAction::DeleteCustomer,
        &CustomerSnapshot::from(&removed),
        user.id(),
        Utc::now(),
    ));

    Ok(StatusCode::NO_CONTENT)
}
