//! Logging configuration and initialization.
//!
//! Events always go to stderr. With an output path they are also appended
//! to that file, which is what the `/logs` endpoint serves back.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shown by `/logs` before anything has been written.
pub const NO_LOGS_PLACEHOLDER: &str = "There are no logs available yet.";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging (default for production).
    #[default]
    Json,
    /// Human-readable pretty printing (for development).
    Pretty,
}

impl LogFormat {
    /// Parse `json` or `pretty` (any case).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format (JSON or Pretty).
    pub format: LogFormat,
    /// Log level filter (e.g., "info", "debug", "xg_serving=trace").
    pub level: String,
    /// Optional file the logs are also appended to.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            output_path: None,
        }
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Failed to open log file: {0}")]
    FileOpen(String),
    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

/// Initialize the tracing subscriber with the given configuration.
///
/// This should be called once at application startup.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LogError::InvalidFilter(e.to_string()))?;

    let file = match &config.output_path {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| LogError::FileOpen(format!("{}: {}", path.display(), e)))?,
        ),
        None => None,
    };

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(file.map(|f| fmt::layer().json().with_writer(Mutex::new(f))))
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .with(file.map(|f| fmt::layer().with_ansi(false).with_writer(Mutex::new(f))))
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized),
    }
}

/// Read the accumulated log file.
///
/// A missing file (or no configured file) yields [`NO_LOGS_PLACEHOLDER`].
pub fn read_log(path: Option<&Path>) -> std::io::Result<String> {
    let Some(path) = path else {
        return Ok(NO_LOGS_PLACEHOLDER.to_string());
    };
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(NO_LOGS_PLACEHOLDER.to_string()),
        Err(e) => Err(e),
    }
}
