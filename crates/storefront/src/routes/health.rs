//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the dealership backend is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.dealer().check_health().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Dealer backend not ready: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
