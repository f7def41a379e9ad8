//! Shared fixtures for handler tests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use crate::config::ApiConfig;
use crate::{build_router, AppState};
use smartpos_core::Role;
use smartpos_db::repository::audit::AuditLogRow;
use smartpos_db::{AuditRecorder, Database, DbConfig};

pub(crate) struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub manager_token: String,
    pub staff_token: String,
    pub staff_id: i64,
}

/// An app over a fresh in-memory database with one manager and one
/// staff account. The audit worker runs in the background.
pub(crate) async fn test_app() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let (audit, worker) = AuditRecorder::channel(64, db.audit_logs());
    tokio::spawn(worker.run());

    let state = AppState::new(db, audit, ApiConfig::default());

    // Tokens are issued directly; hashing is only exercised by login tests
    let manager = state
        .db
        .users()
        .insert("boss", "not-a-real-hash", None, Role::Manager)
        .await
        .unwrap();
    let staff = state
        .db
        .users()
        .insert("cashier", "not-a-real-hash", None, Role::Staff)
        .await
        .unwrap();

    TestApp {
        manager_token: state.jwt.issue(&manager).unwrap(),
        staff_token: state.jwt.issue(&staff).unwrap(),
        staff_id: staff.id,
        router: build_router(state.clone()),
        state,
    }
}

pub(crate) fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends one request and returns the status with the JSON body
/// (`Null` when empty or not JSON).
pub(crate) async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Polls the audit trail until `count` rows exist for the record, since
/// the worker writes them in the background.
pub(crate) async fn wait_for_audit(
    app: &TestApp,
    table: &str,
    record_id: i64,
    count: usize,
) -> Vec<AuditLogRow> {
    let audit = app.state.db.audit_logs();
    for _ in 0..100 {
        let rows = audit.list_for_record(table, record_id).await.unwrap();
        if rows.len() >= count {
            return rows;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    audit.list_for_record(table, record_id).await.unwrap()
}
