use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::{routing::get, Router};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /metrics -- Prometheus text exposition of the shared registry.
async fn render_metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::InternalError(format!("Failed to encode metrics: {e}")))?;
    Ok(([(CONTENT_TYPE, state.metrics.content_type())], body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(render_metrics))
}
