pub mod auth;
pub mod health;
pub mod index;
pub mod metrics;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree. Everything is mounted at the root.
///
/// ```text
/// /                 service index (GET)
/// /health           dependency health (GET)
/// /metrics          Prometheus exposition (GET)
///
/// /register         create account (POST)
/// /login            authenticate (POST)
/// /me               token identity (GET, requires Bearer token)
///
/// /users            list (GET), create (POST)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(index::router())
        .merge(health::router())
        .merge(metrics::router())
        .merge(auth::router())
        .merge(users::router())
}
