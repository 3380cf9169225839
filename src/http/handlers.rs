//! Liveness and readiness handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;

/// Liveness probe. Always answers, whatever the shutdown state.
pub async fn ping() -> &'static str {
    "pong"
}

/// Readiness probe. 200 "ready" until shutdown begins, then 503 with no body.
pub async fn readyz(State(state): State<AppState>) -> Response {
    if state.readiness.is_ready() {
        (StatusCode::OK, "ready").into_response()
    } else {
        tracing::debug!("Readiness probe answered not ready");
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}
