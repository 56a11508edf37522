//! xG Serving
//!
//! Serves goal probabilities from a binary shot classifier and swaps the
//! active classifier at runtime by fetching another version from an
//! artifact registry.
//!
//! # Request paths
//!
//! - **Predict**: active slot (read) -> feature alignment -> classifier -> positive-class probabilities
//! - **Swap**: version resolution -> fetch -> load -> schema resolution -> commit to slot
//!
//! Predictions never wait on a swap. A failed swap leaves the previously
//! active model in place.

pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod models;
pub mod registry;
pub mod server;
pub mod telemetry;

use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

use config::ServiceConfig;
use engine::PredictionService;
use models::{ActiveModelSlot, ModelLoader, ModelReference, PostcardModelLoader, SwapOrchestrator, SwapOutcome};
use registry::{ArtifactFetcher, ArtifactRegistry, LocalRegistry};
use server::AppState;

/// The assembled service: one active model slot shared by the prediction
/// path and the swap path.
pub struct Service {
    pub config: ServiceConfig,
    pub slot: Arc<ActiveModelSlot>,
    pub predictor: PredictionService,
    pub swapper: Arc<SwapOrchestrator>,
}

impl Service {
    /// Wire the service against the filesystem registry named in `config`.
    pub fn new(config: ServiceConfig) -> Self {
        let registry = Arc::new(LocalRegistry::new(config.registry_root.clone()));
        Self::with_registry(config, registry, Arc::new(PostcardModelLoader))
    }

    /// Wire the service against an arbitrary registry and payload loader.
    pub fn with_registry(
        config: ServiceConfig,
        registry: Arc<dyn ArtifactRegistry>,
        loader: Arc<dyn ModelLoader>,
    ) -> Self {
        let slot = Arc::new(ActiveModelSlot::new());
        let fetcher = ArtifactFetcher::new(registry.clone(), config.staging_dir.clone(), &config.payload_suffix);
        let swapper = Arc::new(SwapOrchestrator::new(
            slot.clone(),
            registry,
            fetcher,
            loader,
            config.fetch_timeout,
        ));
        let predictor = PredictionService::new(slot.clone());

        Self { config, slot, predictor, swapper }
    }

    /// Build the service and make one best-effort attempt to load the
    /// configured default model. The slot stays empty if that fails.
    pub async fn start(config: ServiceConfig) -> Self {
        let service = Self::new(config);
        service.load_default().await;
        service
    }

    /// Swap in the configured default model at its latest version.
    pub async fn load_default(&self) -> Option<SwapOutcome> {
        let name = self.config.default_model.as_deref()?;
        info!(model = name, "preparing to load default model");

        let reference = match ModelReference::latest(name) {
            Ok(r) => r,
            Err(e) => {
                warn!(model = name, error = %e, "invalid default model name, starting without a model");
                return None;
            }
        };

        match self.swapper.swap(reference).await {
            Ok(outcome) => Some(outcome),
            Err(failure) => {
                warn!(error = %failure, "failed to load default model, starting without a model");
                None
            }
        }
    }

    /// HTTP router over this service.
    pub fn router(&self) -> Router {
        let state = AppState {
            predictor: self.predictor.clone(),
            swapper: self.swapper.clone(),
            log_path: self.config.log.output_path.clone(),
        };
        server::router(state, self.config.max_body_bytes)
    }
}
