//! Login and identity routes.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{verify_password, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use smartpos_core::User;

const BAD_CREDENTIALS: &str = "Incorrect username or password";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/users/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Exchanges credentials for a bearer token.
///
/// Unknown users, wrong passwords and deactivated accounts all answer
/// with the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state
        .db
        .users()
        .find_by_username(req.username.trim())
        .await?
        .filter(|u| u.is_active);

    let Some(user) = user else {
        warn!(username = %req.username, "Login rejected: unknown or inactive user");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(&req.password, &user.password_hash).await {
        warn!(username = %user.username, "Login rejected: wrong password");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let access_token = state.jwt.issue(&user)?;
    info!(user_id = user.id, role = user.role.as_str(), "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

pub async fn me(user: CurrentUser) -> Json<User> {
    Json(user.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::testing::{json_request, send, test_app};
    use axum::http::StatusCode;
    use serde_json::json;
    use smartpos_core::Role;

    #[tokio::test]
    async fn test_login_then_me() {
        let app = test_app().await;
        let hash = hash_password("s3cret").unwrap();
        app.state
            .db
            .users()
            .insert("aung", &hash, Some("Aung Aung"), Role::Staff)
            .await
            .unwrap();

        let (status, body) = send(
            &app.router,
            json_request("POST", "/login", None, Some(json!({"username": "aung", "password": "s3cret"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");

        let token = body["access_token"].as_str().unwrap();
        let (status, me) = send(&app.router, json_request("GET", "/users/me", Some(token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "aung");
        assert_eq!(me["role"], "staff");
        assert!(me.get("password_hash").is_none());

        let (status, body) = send(
            &app.router,
            json_request("POST", "/login", None, Some(json!({"username": "aung", "password": "nope"}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let app = test_app().await;
        let (status, _) = send(
            &app.router,
            json_request("POST", "/login", None, Some(json!({"username": "ghost", "password": "x"}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let app = test_app().await;

        let (status, _) = send(&app.router, json_request("GET", "/users/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app.router, json_request("GET", "/users/me", Some("garbage"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, me) =
            send(&app.router, json_request("GET", "/users/me", Some(&app.manager_token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["role"], "manager");
    }
}
