use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"healthy"` when every dependency answers, `"degraded"` otherwise.
    pub status: &'static str,
    /// RFC 3339 time of the check.
    pub timestamp: String,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub services: ServiceHealth,
}

/// Per-dependency status, each `"healthy"` or `"unhealthy"`.
#[derive(Serialize)]
pub struct ServiceHealth {
    pub database: &'static str,
    pub redis: &'static str,
}

fn label(ok: bool) -> &'static str {
    if ok {
        "healthy"
    } else {
        "unhealthy"
    }
}

/// GET /health -- probes the credential store and the session cache.
///
/// Returns 503 when either probe fails.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (db, redis) = tokio::join!(state.users.ping(), state.sessions.ping());

    if let Err(e) = &db {
        tracing::warn!(error = %e, "Database health probe failed");
    }
    if let Err(e) = &redis {
        tracing::warn!(error = %e, "Redis health probe failed");
    }

    let healthy = db.is_ok() && redis.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" },
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            services: ServiceHealth {
                database: label(db.is_ok()),
                redis: label(redis.is_ok()),
            },
        }),
    )
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
