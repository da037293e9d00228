use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: [&'static str; 8],
}

/// GET / -- names the service and lists its endpoints.
async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: [
            "GET /",
            "GET /health",
            "GET /metrics",
            "POST /register",
            "POST /login",
            "GET /me",
            "GET /users",
            "POST /users",
        ],
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}
