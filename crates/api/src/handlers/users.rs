//! Handlers for the `/users` resource.

use authgate_db::models::user::UserResponse;
use axum::extract::State;
use axum::http::StatusCode;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::auth::RegisterRequest;
use crate::state::AppState;

/// GET /users
///
/// List every user's public fields, ordered by id.
pub async fn list(State(state): State<AppState>) -> AppResult<AppJson<Vec<UserResponse>>> {
    let users = state.auth.list_users().await?;
    Ok(AppJson(users))
}

/// POST /users
///
/// Same workflow as `POST /register`.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, AppJson<UserResponse>)> {
    let user = state
        .auth
        .register(&input.username, &input.email, &input.password)
        .await?;
    Ok((StatusCode::CREATED, AppJson(user)))
}
