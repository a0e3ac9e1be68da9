//! Registration, login and session authentication
//!
//! Clients log in once and send `Authorization: Bearer <token>` on every
//! protected request. Tokens are opaque random strings stored in `sessions`.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use schematic_common::auth::MIN_PASSWORD_LEN;
use schematic_common::models::User;

use super::json_body;
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Authenticated caller, inserted into request extensions by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    /// Session token the request was made with
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if !req.email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let request = json_body(payload)?;
    validate_registration(&request)?;

    let user = users::create_user(
        &state.db,
        &request.email,
        request.name.trim(),
        &request.password,
    )
    .await?
    .ok_or_else(|| ApiError::Conflict("Email already registered".to_string()))?;

    info!(user_id = %user.id, "Registered new account");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let request = json_body(payload)?;

    let user = users::authenticate(&state.db, &request.email, &request.password)
        .await?
        .ok_or_else(|| ApiError::InvalidCredentials("Invalid email or password".to_string()))?;

    let session = users::create_session(&state.db, &user.id).await?;
    debug!(user_id = %user.id, "Session issued");

    // Sweep expired sessions
    match users::purge_expired_sessions(&state.db, Utc::now()).await {
        Ok(0) => {}
        Ok(purged) => debug!(purged, "Expired sessions removed"),
        Err(e) => warn!(error = %e, "Failed to purge expired sessions"),
    }

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<serde_json::Value>> {
    users::delete_session(&state.db, &auth.token).await?;
    debug!(user_id = %auth.id, "Session ended");
    Ok(Json(json!({ "success": true })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<User>> {
    let user = users::get_user(&state.db, &auth.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(user))
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Session authentication middleware
///
/// Missing, unknown and expired tokens all yield 401 `Unauthorized`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let user_id = users::session_user(&state.db, &token, Utc::now())
        .await?
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser { id: user_id, token });

    Ok(next.run(request).await)
}

/// Public auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Auth routes that need a session
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}
