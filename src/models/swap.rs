//! Model swap orchestration.
//!
//! Resolve -> fetch -> load -> resolve schema -> commit, serialized by a
//! swap lock. Predictions never take that lock; they keep reading whatever
//! model is committed. Any failure before commit leaves the slot untouched.

use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{oneshot, OwnedMutexGuard};
use tracing::{debug, error, info, warn, Instrument, Span};

use super::loader::{load_payload, LoadError, ModelLoader};
use super::reference::{ModelReference, VersionSpec};
use super::slot::{ActiveModelSlot, LoadedModel};
use crate::engine::resolve_schema;
use crate::registry::{resolve_latest, ArtifactFetcher, ArtifactRegistry, FetchError, RegistryError};
use crate::telemetry;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("{0}")]
    NotFound(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("No .{suffix} files in downloaded artifact path {}", .dir.display())]
    NoPayloadFound { dir: PathBuf, suffix: String },

    #[error("Failed to load model: {0}")]
    LoadFailed(String),
}

impl SwapError {
    /// Stable identifier used in structured failure responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Registry(_) => "registry_error",
            Self::NoPayloadFound { .. } => "no_payload_found",
            Self::LoadFailed(_) => "load_failed",
        }
    }
}

impl From<RegistryError> for SwapError {
    fn from(e: RegistryError) -> Self {
        if e.is_not_found() {
            Self::NotFound(e.to_string())
        } else {
            Self::Registry(e.to_string())
        }
    }
}

impl From<FetchError> for SwapError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Registry(inner) => inner.into(),
            FetchError::NoPayloadFound { dir, suffix } => Self::NoPayloadFound { dir, suffix },
            FetchError::Io(io) => Self::Registry(format!("staging failed: {}", io)),
        }
    }
}

impl From<LoadError> for SwapError {
    fn from(e: LoadError) -> Self {
        Self::LoadFailed(e.to_string())
    }
}

/// Where a swap currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapState {
    Idle,
    ResolvingVersion,
    Fetching,
    Loading,
    ResolvingSchema,
    Committing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    AlreadyLoaded,
    Success,
}

/// Result of a successful (or no-op) swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub status: SwapStatus,
    pub model: String,
    pub version: String,
}

/// A failed swap. The slot still holds `model_remaining_loaded`.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SwapFailure {
    pub error: SwapError,
    pub model_remaining_loaded: Option<String>,
}

/// The blocking part of a swap, shared with worker threads.
struct SwapPipeline {
    registry: Arc<dyn ArtifactRegistry>,
    fetcher: ArtifactFetcher,
    loader: Arc<dyn ModelLoader>,
}

impl SwapPipeline {
    fn run(&self, reference: &ModelReference, state: &Mutex<SwapState>) -> Result<LoadedModel, SwapError> {
        let name = reference.name();

        *state.lock() = SwapState::ResolvingVersion;
        let version = match reference.version() {
            VersionSpec::Latest => resolve_latest(self.registry.as_ref(), name)?,
            VersionSpec::Exact(v) => v.clone(),
        };
        info!(model = name, version = %version, "resolved artifact version");

        *state.lock() = SwapState::Fetching;
        let payload_path = self.fetcher.fetch(name, &version)?;

        *state.lock() = SwapState::Loading;
        let payload = load_payload(self.loader.as_ref(), &payload_path)?;

        *state.lock() = SwapState::ResolvingSchema;
        let schema = resolve_schema(payload.classifier.as_ref(), name);
        info!(
            model = name,
            version = %version,
            features = ?schema.names,
            source = ?schema.source,
            sha256 = %payload.sha256,
            size_bytes = payload.size_bytes,
            "model loaded"
        );

        Ok(LoadedModel::new(name, version, payload.classifier, schema).with_sha256(payload.sha256))
    }
}

/// Serializes model swaps against one [`ActiveModelSlot`].
pub struct SwapOrchestrator {
    slot: Arc<ActiveModelSlot>,
    pipeline: Arc<SwapPipeline>,
    lock: Arc<tokio::sync::Mutex<()>>,
    state: Arc<Mutex<SwapState>>,
    timeout: Duration,
}

impl SwapOrchestrator {
    pub fn new(
        slot: Arc<ActiveModelSlot>,
        registry: Arc<dyn ArtifactRegistry>,
        fetcher: ArtifactFetcher,
        loader: Arc<dyn ModelLoader>,
        timeout: Duration,
    ) -> Self {
        Self {
            slot,
            pipeline: Arc::new(SwapPipeline { registry, fetcher, loader }),
            lock: Arc::new(tokio::sync::Mutex::new(())),
            state: Arc::new(Mutex::new(SwapState::Idle)),
            timeout,
        }
    }

    pub fn slot(&self) -> &Arc<ActiveModelSlot> {
        &self.slot
    }

    pub fn state(&self) -> SwapState {
        *self.state.lock()
    }

    /// Make `reference` the active model.
    ///
    /// Requesting the model that is already active is a no-op that never
    /// touches the registry. On failure the previously active model, if
    /// any, keeps serving.
    ///
    /// Once started, a swap runs to completion on its own task even if the
    /// caller stops waiting; the swap lock is held until it finishes.
    pub async fn swap(&self, reference: ModelReference) -> Result<SwapOutcome, SwapFailure> {
        let started = Instant::now();
        let guard = self.lock.clone().lock_owned().await;

        if let Some(active) = self.slot.current() {
            if active.name() == reference.name() {
                info!(model = reference.name(), "requested model is already loaded, no changes made");
                telemetry::record_swap("already_loaded", started.elapsed());
                return Ok(SwapOutcome {
                    status: SwapStatus::AlreadyLoaded,
                    model: active.name().to_string(),
                    version: active.version().to_string(),
                });
            }
        }

        info!(reference = %reference, "starting model swap");
        let job = SwapJob {
            slot: self.slot.clone(),
            pipeline: self.pipeline.clone(),
            state: self.state.clone(),
            timeout: self.timeout,
            reference: reference.clone(),
            started,
        };
        let (reply, outcome) = oneshot::channel();
        tokio::spawn(job.run(guard, reply).instrument(Span::current()));

        match outcome.await {
            Ok(result) => result,
            Err(_) => {
                let error = SwapError::LoadFailed("swap task ended without a result".to_string());
                Err(fail(&self.slot, &reference, error, started))
            }
        }
    }
}

/// One swap in flight. Owns the swap lock until the pipeline has stopped.
struct SwapJob {
    slot: Arc<ActiveModelSlot>,
    pipeline: Arc<SwapPipeline>,
    state: Arc<Mutex<SwapState>>,
    timeout: Duration,
    reference: ModelReference,
    started: Instant,
}

type SwapReply = oneshot::Sender<Result<SwapOutcome, SwapFailure>>;

impl SwapJob {
    async fn run(self, guard: OwnedMutexGuard<()>, reply: SwapReply) {
        let pipeline = self.pipeline.clone();
        let state = self.state.clone();
        let requested = self.reference.clone();
        let mut task = tokio::task::spawn_blocking(move || pipeline.run(&requested, &state));

        let waited = tokio::time::timeout(self.timeout, &mut task).await;
        let result = match waited {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(SwapError::LoadFailed(format!("swap task aborted: {}", join_error))),
            Err(_) => {
                let error = SwapError::Registry(format!(
                    "timed out after {:?} fetching {}",
                    self.timeout, self.reference
                ));
                let _ = reply.send(Err(fail(&self.slot, &self.reference, error, self.started)));

                // The blocking task cannot be cancelled. Keep the staging area
                // locked until it finishes and throw its result away.
                let _ = task.await;
                *self.state.lock() = SwapState::Idle;
                drop(guard);
                return;
            }
        };

        let outcome = match result {
            Ok(model) => Ok(self.commit(model)),
            Err(error) => Err(fail(&self.slot, &self.reference, error, self.started)),
        };

        *self.state.lock() = SwapState::Idle;
        drop(guard);
        if reply.send(outcome).is_err() {
            debug!(reference = %self.reference, "swap finished after its caller went away");
        }
    }

    fn commit(&self, model: LoadedModel) -> SwapOutcome {
        *self.state.lock() = SwapState::Committing;
        let outcome = SwapOutcome {
            status: SwapStatus::Success,
            model: model.name().to_string(),
            version: model.version().to_string(),
        };
        let previous = self.slot.commit(model);
        info!(
            model = %outcome.model,
            version = %outcome.version,
            previous = ?previous.as_ref().map(|m| m.name()),
            "active model swapped"
        );
        telemetry::record_swap("success", self.started.elapsed());
        outcome
    }
}

fn fail(slot: &ActiveModelSlot, reference: &ModelReference, error: SwapError, started: Instant) -> SwapFailure {
    let remaining = slot.current_name();
    match &error {
        SwapError::NotFound(_) => warn!(reference = %reference, error = %error, "swap failed"),
        _ => error!(reference = %reference, error = %error, kind = error.kind(), "swap failed"),
    }
    info!(model_remaining_loaded = ?remaining, "keeping previously loaded model");
    telemetry::record_swap("failed", started.elapsed());
    SwapFailure { error, model_remaining_loaded: remaining }
}
