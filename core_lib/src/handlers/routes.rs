//! Route table and the small service endpoints

use crate::{
    extractors::ApiJson,
    handlers::{admin, health},
    models::HelloResponse,
    version::BuildInfo,
    AppState,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};
use tracing::debug;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(health::handle_liveness))
        .route("/health/ready", get(health::handle_readiness))
        .route("/version", get(handle_version))
        .route("/api/v1/hello", get(handle_hello))
        .route("/api/v1/echo", post(handle_echo))
        .route(
            "/api/v1/admin/log-level",
            get(admin::handle_get_log_level).put(admin::handle_put_log_level),
        )
}

async fn handle_version(State(state): State<AppState>) -> Json<BuildInfo> {
    Json(state.build_info)
}

async fn handle_hello(State(state): State<AppState>) -> Json<HelloResponse> {
    Json(HelloResponse {
        message: format!("Hello from {}", state.app_name),
        version: state.version,
    })
}

async fn handle_echo(ApiJson(body): ApiJson<Map<String, Value>>) -> Json<Map<String, Value>> {
    debug!("POST /api/v1/echo - {} fields", body.len());
    Json(body)
}
