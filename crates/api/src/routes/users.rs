use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// GET  /users -> list
/// POST /users -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(users::list).post(users::create))
}
