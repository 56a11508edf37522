//! Prediction service: validate, align, infer, shape.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::{align, FeatureTable, InferenceError};
use crate::models::ActiveModelSlot;
use crate::telemetry;

/// Index of the positive ("goal") class in a probability row.
const POSITIVE_CLASS: usize = 1;

/// Serves predictions from whatever model the slot holds at request time.
#[derive(Debug, Clone)]
pub struct PredictionService {
    slot: Arc<ActiveModelSlot>,
}

impl PredictionService {
    pub fn new(slot: Arc<ActiveModelSlot>) -> Self {
        Self { slot }
    }

    /// Predict from a raw `feature -> values` JSON payload.
    pub fn predict(&self, payload: &Value) -> Result<Vec<f64>, InferenceError> {
        record(self.ensure_loaded().and_then(|()| self.predict_value(payload)))
    }

    /// Predict from an unparsed request body.
    pub fn predict_bytes(&self, body: &[u8]) -> Result<Vec<f64>, InferenceError> {
        record(self.ensure_loaded().and_then(|()| {
            let payload: Value = serde_json::from_slice(body).map_err(|e| {
                InferenceError::MalformedInput(format!("request body must contain JSON: {}", e))
            })?;
            self.predict_value(&payload)
        }))
    }

    // With nothing loaded the input is irrelevant, so this check runs first.
    fn ensure_loaded(&self) -> Result<(), InferenceError> {
        if self.slot.is_empty() {
            return Err(InferenceError::NoModelLoaded);
        }
        Ok(())
    }

    fn predict_value(&self, payload: &Value) -> Result<Vec<f64>, InferenceError> {
        let table = FeatureTable::from_json(payload)?;
        debug!(rows = table.n_rows(), columns = ?table.column_names(), "parsed prediction input");
        self.predict_table(&table)
    }

    /// Positive-class probability for each row of `table`, in row order.
    pub fn predict_table(&self, table: &FeatureTable) -> Result<Vec<f64>, InferenceError> {
        let model = self.slot.current().ok_or(InferenceError::NoModelLoaded)?;
        tracing::Span::current().record("model", model.name());
        let classifier = model.classifier();

        let aligned = align(
            table,
            classifier.trained_feature_names(),
            classifier.trained_feature_count(),
        )?;
        let proba = classifier.predict_proba(&aligned)?;

        if proba.len() != aligned.n_rows() {
            return Err(InferenceError::ExecutionFailed(format!(
                "classifier returned {} rows for {} inputs",
                proba.len(),
                aligned.n_rows()
            )));
        }

        let predictions = proba
            .iter()
            .map(|row| {
                row.get(POSITIVE_CLASS).copied().ok_or_else(|| {
                    InferenceError::ExecutionFailed(format!(
                        "expected two class probabilities per row, got {}",
                        row.len()
                    ))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        info!(model = model.name(), rows = predictions.len(), "generated predictions");
        Ok(predictions)
    }
}

fn record(result: Result<Vec<f64>, InferenceError>) -> Result<Vec<f64>, InferenceError> {
    match &result {
        Ok(p) => telemetry::record_prediction("ok", p.len()),
        Err(e) => telemetry::record_prediction(e.kind(), 0),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{resolve_schema, Classifier, LogisticRegression};
    use crate::models::LoadedModel;
    use serde_json::json;

    fn service_with(name: &str, classifier: Arc<dyn Classifier>) -> PredictionService {
        let slot = Arc::new(ActiveModelSlot::new());
        let schema = resolve_schema(classifier.as_ref(), name);
        slot.commit(LoadedModel::new(name, "v1", classifier, schema));
        PredictionService::new(slot)
    }

    #[test]
    fn test_no_model_loaded() {
        let service = PredictionService::new(Arc::new(ActiveModelSlot::new()));
        let err = service.predict(&json!({"distance_from_net": [20]})).unwrap_err();
        assert!(matches!(err, InferenceError::NoModelLoaded));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_no_model_checked_before_input() {
        let service = PredictionService::new(Arc::new(ActiveModelSlot::new()));
        let err = service.predict(&json!("not a table")).unwrap_err();
        assert!(matches!(err, InferenceError::NoModelLoaded));
    }

    #[test]
    fn test_invalid_json_body() {
        let service = service_with("logreg_distance", Arc::new(LogisticRegression::new(vec![-0.05], 1.0)));
        let err = service.predict_bytes(b"{not json").unwrap_err();
        assert!(matches!(err, InferenceError::MalformedInput(_)));

        let empty = PredictionService::new(Arc::new(ActiveModelSlot::new()));
        assert!(matches!(empty.predict_bytes(b"{not json"), Err(InferenceError::NoModelLoaded)));
    }

    #[test]
    fn test_malformed_input() {
        let service = service_with("logreg_distance", Arc::new(LogisticRegression::new(vec![-0.05], 1.0)));
        let err = service.predict(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedInput(_)));
    }

    #[test]
    fn test_one_probability_per_row_in_order() {
        let model = LogisticRegression::new(vec![-0.05], 1.0).with_feature_names(["distance_from_net"]);
        let service = service_with("logreg_distance", Arc::new(model));

        let predictions = service
            .predict(&json!({"distance_from_net": [5, 80, 20], "ignored": [0, 0, 0]}))
            .unwrap();
        assert_eq!(predictions.len(), 3);
        assert!(predictions[0] > predictions[2]);
        assert!(predictions[2] > predictions[1]);
    }

    #[derive(Debug)]
    struct OneClass;

    impl Classifier for OneClass {
        fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<Vec<f64>>, InferenceError> {
            Ok(vec![vec![1.0]; table.n_rows()])
        }

        fn trained_feature_count(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_single_class_output_is_execution_error() {
        let service = service_with("odd", Arc::new(OneClass));
        let err = service.predict(&json!({"x": [1]})).unwrap_err();
        assert!(matches!(err, InferenceError::ExecutionFailed(_)));
    }
}
