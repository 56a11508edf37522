//! Inference engine module.
//!
//! Holds the classifier capability, the request feature table, feature
//! schema resolution and alignment, and the prediction service that ties
//! them to the active model slot.

pub mod align;
pub mod error;
pub mod logistic;
pub mod schema;
pub mod table;

mod predict;

pub use align::align;
pub use error::InferenceError;
pub use logistic::LogisticRegression;
pub use predict::PredictionService;
pub use schema::{resolve_schema, FeatureSchema, SchemaSource, DEFAULT_FEATURES};
pub use table::{Column, FeatureTable};

/// Binary classifier produced by deserializing a model payload.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Per-class probabilities for every row, in input row order.
    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<Vec<f64>>, InferenceError>;

    /// Feature names recorded at training time, if the payload kept them.
    fn trained_feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Input dimensionality the classifier was trained with.
    fn trained_feature_count(&self) -> usize;
}
