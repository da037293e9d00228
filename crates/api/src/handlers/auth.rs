//! Handlers for registration, login and caller identity.

use std::fmt;

use authgate_core::types::DbId;
use authgate_db::models::user::UserResponse;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /register` and `POST /users`.
///
/// Absent fields deserialize as empty strings and are reported by validation.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Request body for `POST /login`.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session_id: String,
    pub user: UserResponse,
}

/// Response for `GET /me`, built from the token claims alone.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: DbId,
    pub username: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /register
///
/// Create an account. Returns 201 with the public user fields.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, AppJson<UserResponse>)> {
    let user = state
        .auth
        .register(&input.username, &input.email, &input.password)
        .await?;
    Ok((StatusCode::CREATED, AppJson(user)))
}

/// POST /login
///
/// Verify credentials and return a token and a session id.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<AppJson<LoginResponse>> {
    let outcome = state.auth.login(&input.username, &input.password).await?;
    Ok(AppJson(LoginResponse {
        token: outcome.token,
        session_id: outcome.session.id,
        user: outcome.user,
    }))
}

/// GET /me
pub async fn me(user: AuthUser) -> AppJson<MeResponse> {
    AppJson(MeResponse {
        id: user.user_id,
        username: user.username,
        issued_at: user.issued_at,
        expires_at: user.expires_at,
    })
}
