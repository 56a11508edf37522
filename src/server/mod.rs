//! HTTP surface over the prediction and swap core.

mod error;
mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::PredictionService;
use crate::models::SwapOrchestrator;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub predictor: PredictionService,
    pub swapper: Arc<SwapOrchestrator>,
    pub log_path: Option<PathBuf>,
}

/// Build the service router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/download_registry_model", post(handlers::download_registry_model))
        .route("/logs", get(handlers::logs))
        .route("/model", get(handlers::model_info))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `listener` until Ctrl-C.
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    info!(addr = ?listener.local_addr().ok(), "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        // Without a signal handler, run until the process is killed.
        Err(_) => std::future::pending::<()>().await,
    }
}
