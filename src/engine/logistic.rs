//! Logistic regression classifier.

use serde::{Deserialize, Serialize};

use super::{Classifier, FeatureTable, InferenceError};

/// Binary logistic regression: `p(goal) = sigmoid(intercept + coefficients . x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Column names seen at fit time. Older payloads do not carry them.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self { coefficients, intercept, feature_names: None }
    }

    pub fn with_feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Reject payloads that cannot produce a prediction.
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("coefficients cannot be empty".into());
        }
        if self.coefficients.iter().any(|c| !c.is_finite()) || !self.intercept.is_finite() {
            return Err("coefficients and intercept must be finite".into());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Err(format!(
                    "{} feature names for {} coefficients",
                    names.len(),
                    self.coefficients.len()
                ));
            }
        }
        Ok(())
    }

    fn decision(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticRegression {
    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<Vec<f64>>, InferenceError> {
        if table.n_columns() != self.coefficients.len() {
            return Err(InferenceError::ExecutionFailed(format!(
                "X has {} features, but the classifier expects {}",
                table.n_columns(),
                self.coefficients.len()
            )));
        }

        Ok(table
            .rows()
            .map(|row| {
                let p = sigmoid(self.decision(&row));
                vec![1.0 - p, p]
            })
            .collect())
    }

    fn trained_feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn trained_feature_count(&self) -> usize {
        self.coefficients.len()
    }
}
