//! HTTP handlers. Each one catches every error at its boundary and turns
//! it into a structured response.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info, Instrument};

use super::AppState;
use crate::engine::InferenceError;
use crate::models::{ModelReference, ReferenceError};
use crate::telemetry::{read_log, RequestSpan, SpanExt};

pub(super) async fn predict(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = RequestSpan::new_id();
    let span = RequestSpan::predict(&request_id);

    // Parsing and scoring a large body is CPU work; keep it off the executor.
    let predictor = state.predictor.clone();
    let worker_span = span.clone();
    let result = tokio::task::spawn_blocking(move || worker_span.in_scope(|| predictor.predict_bytes(&body)))
        .await
        .unwrap_or_else(|e| Err(InferenceError::ExecutionFailed(format!("prediction task aborted: {}", e))));
    span.record_result(&result);

    match result {
        Ok(predictions) => Json(json!({ "predictions": predictions })).into_response(),
        Err(e) => {
            span.in_scope(|| error!(error = %e, kind = e.kind(), "prediction failed"));
            e.into_response()
        }
    }
}

/// Pull a field as text; numeric versions are accepted as-is.
fn field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(super) async fn download_registry_model(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    info!(payload = %payload, "swap requested");

    let (Some(model), Some(version)) = (field(&payload, "model"), field(&payload, "version")) else {
        return ReferenceError::Missing.into_response();
    };
    let reference = match ModelReference::new(&model, &version) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    let request_id = RequestSpan::new_id();
    let span = RequestSpan::swap(&request_id, &model, &version);
    let result = state.swapper.swap(reference).instrument(span.clone()).await;
    span.record_result(&result);

    match result {
        Ok(outcome) => Json(json!({
            "status": outcome.status,
            "model": outcome.model,
            "version": outcome.version,
        }))
        .into_response(),
        Err(failure) => failure.into_response(),
    }
}

pub(super) async fn logs(State(state): State<AppState>) -> Response {
    match read_log(state.log_path.as_deref()) {
        Ok(content) => Json(json!({ "logs": content })).into_response(),
        Err(e) => {
            error!(error = %e, "failed to read the log file");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

pub(super) async fn model_info(State(state): State<AppState>) -> Response {
    let body = match state.swapper.slot().current() {
        Some(model) => json!({
            "model": model.name(),
            "version": model.version(),
            "features": model.expected_features(),
            "schema_source": model.schema_source(),
            "sha256": model.sha256(),
            "loaded_at": model.loaded_at(),
        }),
        None => json!({ "model": null }),
    };
    Json(body).into_response()
}

pub(super) async fn health(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": !state.swapper.slot().is_empty(),
        "swap_state": state.swapper.state(),
    }))
    .into_response()
}
