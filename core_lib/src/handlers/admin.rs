//! Administrative endpoints

use crate::{
    error::Result,
    extractors::ApiJson,
    models::{LogLevelRequest, LogLevelResponse, LogLevelUpdated},
    AppState,
};
use axum::{extract::State, Json};
use tracing::info;

pub async fn handle_get_log_level(State(state): State<AppState>) -> Json<LogLevelResponse> {
    Json(LogLevelResponse {
        level: state.log_levels.level().to_string(),
    })
}

pub async fn handle_put_log_level(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LogLevelRequest>,
) -> Result<Json<LogLevelUpdated>> {
    let level = state.log_levels.set_level(&request.level)?;

    info!(new_level = %level, "Log level changed");

    Ok(Json(LogLevelUpdated {
        level: level.to_string(),
        message: "Log level updated successfully".to_string(),
    }))
}
