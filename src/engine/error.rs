//! Request-scoped error types for prediction.
//!
//! None of these errors touch the active model slot: a failed prediction
//! leaves the service exactly as it found it.

use thiserror::Error;

/// Errors that can occur while serving a prediction request.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("No model is currently loaded")]
    NoModelLoaded,

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Missing required model features: {missing:?}. Input received: {received:?}")]
    MissingFeatures {
        missing: Vec<String>,
        received: Vec<String>,
    },

    #[error("Model expects {expected} features, but received {received}. Input columns: {columns:?}")]
    FeatureCountMismatch {
        expected: usize,
        received: usize,
        columns: Vec<String>,
    },

    #[error("Inference failed: {0}")]
    ExecutionFailed(String),
}

impl InferenceError {
    /// Stable identifier used in structured error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoModelLoaded => "no_model_loaded",
            Self::MalformedInput(_) => "malformed_input",
            Self::MissingFeatures { .. } | Self::FeatureCountMismatch { .. } => "schema_mismatch",
            Self::ExecutionFailed(_) => "inference_failed",
        }
    }

    /// Returns true if the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput(_) | Self::MissingFeatures { .. } | Self::FeatureCountMismatch { .. }
        )
    }

    /// HTTP-equivalent status code for this error.
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_share_kind() {
        let missing = InferenceError::MissingFeatures {
            missing: vec!["distance_from_net".into()],
            received: vec!["angle_from_net".into()],
        };
        let count = InferenceError::FeatureCountMismatch {
            expected: 2,
            received: 1,
            columns: vec!["a".into()],
        };
        assert_eq!(missing.kind(), "schema_mismatch");
        assert_eq!(count.kind(), "schema_mismatch");
        assert_eq!(missing.status_code(), 400);
    }

    #[test]
    fn test_server_side_errors_map_to_500() {
        assert_eq!(InferenceError::NoModelLoaded.status_code(), 500);
        assert_eq!(InferenceError::ExecutionFailed("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_missing_features_message_names_both_sides() {
        let err = InferenceError::MissingFeatures {
            missing: vec!["distance_from_net".into()],
            received: vec!["angle_from_net".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("distance_from_net"));
        assert!(msg.contains("angle_from_net"));
    }
}
