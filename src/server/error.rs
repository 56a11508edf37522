//! Error-to-response mapping for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::engine::InferenceError;
use crate::models::{ReferenceError, SwapFailure};

impl IntoResponse for InferenceError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for SwapFailure {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "failed",
            "error": self.error.to_string(),
            "kind": self.error.kind(),
            "model_remaining_loaded": self.model_remaining_loaded,
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl IntoResponse for ReferenceError {
    fn into_response(self) -> Response {
        let message = match self {
            ReferenceError::Missing => {
                "model and version fields are required for successful retrieval".to_string()
            }
            other => other.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
    }
}
