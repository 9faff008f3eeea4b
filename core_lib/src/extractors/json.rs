//! JSON body extractor that answers malformed input with a JSON 400

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Like `axum::Json`, but parses the body regardless of `Content-Type` and
/// rejects with `{"error": "Invalid JSON body"}` instead of plain text.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiJsonRejection::UnreadableBody(rejection.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(ApiJson)
            .map_err(|e| ApiJsonRejection::InvalidJson(e.to_string()))
    }
}

#[derive(Debug)]
pub enum ApiJsonRejection {
    InvalidJson(String),
    UnreadableBody(String),
}

impl IntoResponse for ApiJsonRejection {
    fn into_response(self) -> Response {
        match &self {
            ApiJsonRejection::InvalidJson(detail) => {
                tracing::debug!("Rejected request body: {}", detail);
            }
            ApiJsonRejection::UnreadableBody(detail) => {
                tracing::warn!("Failed to read request body: {}", detail);
            }
        }

        let body = Json(json!({
            "error": "Invalid JSON body",
        }));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

impl std::fmt::Display for ApiJsonRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiJsonRejection::InvalidJson(msg) => write!(f, "Invalid JSON: {}", msg),
            ApiJsonRejection::UnreadableBody(msg) => write!(f, "Unreadable body: {}", msg),
        }
    }
}

impl std::error::Error for ApiJsonRejection {}
