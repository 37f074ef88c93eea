use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::cors;

/// Errors raised by the token store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Bearer credential missing, malformed, or rejected by the backend.
    #[error("Invalid or missing bearer credential")]
    Unauthenticated,

    /// Request body missing a required field or otherwise unusable.
    #[error("Invalid payload: {0}")]
    InvalidPayload(&'static str),

    /// The storage layer refused the upsert.
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        match &self {
            Self::Unauthenticated => {
                tracing::warn!("token store rejected caller credential");
            }
            Self::InvalidPayload(reason) => {
                tracing::warn!(%reason, "token store rejected payload");
            }
            Self::Storage(source) => {
                tracing::error!(error = %source, "token record upsert failed");
            }
        }
        // Contract: one generic client-error status for every failure kind;
        // callers distinguish failures by message only.
        (
            StatusCode::BAD_REQUEST,
            cors::cors_headers(),
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
