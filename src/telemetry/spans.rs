//! Span utilities and extension traits for request tracing.
//!
//! Provides standardized span creation and result recording.

use tracing::{info_span, Span};
use uuid::Uuid;

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for creating standardized request spans.
pub struct RequestSpan;

impl RequestSpan {
    /// Fresh request identifier.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Span for one prediction request.
    ///
    /// `model` is filled in once the active model is known; `status` and
    /// `error.message` by [`SpanExt::record_result`].
    pub fn predict(request_id: &str) -> Span {
        info_span!(
            "predict_request",
            request_id = %request_id,
            model = tracing::field::Empty,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }

    /// Span for one model swap request.
    pub fn swap(request_id: &str, model: &str, version: &str) -> Span {
        info_span!(
            "swap_request",
            request_id = %request_id,
            model = %model,
            version = %version,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }
}
