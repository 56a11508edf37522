//! The process-wide active model slot.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::engine::{Classifier, FeatureSchema, SchemaSource};

/// One successfully loaded model. Never mutated after construction;
/// a swap replaces it wholesale.
#[derive(Debug)]
pub struct LoadedModel {
    name: String,
    version: String,
    classifier: Arc<dyn Classifier>,
    expected_features: Vec<String>,
    schema_source: SchemaSource,
    sha256: Option<String>,
    loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        classifier: Arc<dyn Classifier>,
        schema: FeatureSchema,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            classifier,
            expected_features: schema.names,
            schema_source: schema.source,
            sha256: None,
            loaded_at: Utc::now(),
        }
    }

    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry identifier the model was fetched at.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn expected_features(&self) -> &[String] {
        &self.expected_features
    }

    pub fn schema_source(&self) -> SchemaSource {
        self.schema_source
    }

    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Holds at most one [`LoadedModel`].
///
/// Readers clone the `Arc` under a short read lock and keep serving from
/// it even if a commit lands mid-request. A commit is a single pointer
/// replacement, so no reader ever sees a partially built model.
#[derive(Debug, Default)]
pub struct ActiveModelSlot {
    current: RwLock<Option<Arc<LoadedModel>>>,
}

impl ActiveModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the active model, if any.
    pub fn current(&self) -> Option<Arc<LoadedModel>> {
        self.current.read().clone()
    }

    pub fn current_name(&self) -> Option<String> {
        self.current.read().as_ref().map(|m| m.name.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_none()
    }

    /// Replace the active model, returning the one it displaced.
    ///
    /// Commits must be serialized by the caller; see
    /// [`SwapOrchestrator`](super::SwapOrchestrator).
    pub fn commit(&self, model: LoadedModel) -> Option<Arc<LoadedModel>> {
        let model = Arc::new(model);
        std::mem::replace(&mut *self.current.write(), Some(model))
    }
}
