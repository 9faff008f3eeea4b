//! Liveness and readiness probes

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Time kept back from the request budget so a timed-out readiness report is
/// still written before the request timeout layer answers with 408.
pub const READINESS_RESPONSE_MARGIN: Duration = Duration::from_millis(250);

pub async fn handle_liveness(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /health/live - Liveness probe");

    (StatusCode::OK, Json(state.health_checker.liveness()))
}

pub async fn handle_readiness(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /health/ready - Readiness probe");

    let deadline =
        Instant::now() + state.request_timeout.saturating_sub(READINESS_RESPONSE_MARGIN);
    let report = state.health_checker.readiness(Some(deadline)).await;

    let status_code = if report.is_healthy() {
        StatusCode::OK
    } else {
        warn!("Service is not ready");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(report))
}
