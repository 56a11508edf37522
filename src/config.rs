//! Service configuration loading from environment variables.
//!
//! All configuration values are loaded from `XG_SERVING_*` environment
//! variables with sensible defaults. Invalid values fall back to defaults
//! without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `XG_SERVING_BIND_ADDR` | 0.0.0.0:5000 | HTTP listen address |
//! | `XG_SERVING_REGISTRY_ROOT` | registry | Artifact registry directory |
//! | `XG_SERVING_STAGING_DIR` | models | Local download staging directory |
//! | `XG_SERVING_PAYLOAD_SUFFIX` | bin | Model payload file extension |
//! | `XG_SERVING_DEFAULT_MODEL` | logreg_distance | Model loaded at startup (empty = none) |
//! | `XG_SERVING_FETCH_TIMEOUT` | 300 | Swap fetch/load timeout (secs) |
//! | `XG_SERVING_WORKERS` | CPU count | Request worker threads |
//! | `XG_SERVING_MAX_BODY_BYTES` | 16777216 | Max request body size (bytes) |
//! | `XG_SERVING_LOG_FILE` | serving.log | Log file served by `/logs` (empty = none) |
//! | `XG_SERVING_LOG_LEVEL` | info | Log filter directive |
//! | `XG_SERVING_LOG_FORMAT` | json | `json` or `pretty` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_REGISTRY_ROOT: &str = "registry";
pub const DEFAULT_STAGING_DIR: &str = "models";
pub const DEFAULT_PAYLOAD_SUFFIX: &str = "bin";
pub const DEFAULT_MODEL: &str = "logreg_distance";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_LOG_FILE: &str = "serving.log";

/// All service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub registry_root: PathBuf,
    pub staging_dir: PathBuf,
    pub payload_suffix: String,
    /// Model swapped in at startup; `None` starts with an empty slot.
    pub default_model: Option<String>,
    pub fetch_timeout: Duration,
    pub workers: usize,
    pub max_body_bytes: usize,
    pub log: LogConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            registry_root: PathBuf::from(DEFAULT_REGISTRY_ROOT),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            payload_suffix: DEFAULT_PAYLOAD_SUFFIX.to_string(),
            default_model: Some(DEFAULT_MODEL.to_string()),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            workers: num_cpus::get().max(1),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log: LogConfig {
                output_path: Some(PathBuf::from(DEFAULT_LOG_FILE)),
                ..LogConfig::default()
            },
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// String env var; `None` when unset.
fn var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Path env var where an empty value disables the feature.
fn optional_path(key: &str, default: &str) -> Option<PathBuf> {
    match var(key) {
        Some(v) if v.trim().is_empty() => None,
        Some(v) => Some(PathBuf::from(v)),
        None => Some(PathBuf::from(default)),
    }
}

/// Load logging configuration from environment.
fn load_log_config() -> LogConfig {
    let format = var("XG_SERVING_LOG_FORMAT")
        .and_then(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    let level = var("XG_SERVING_LOG_LEVEL")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    LogConfig {
        format,
        level,
        output_path: optional_path("XG_SERVING_LOG_FILE", DEFAULT_LOG_FILE),
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> ServiceConfig {
    let bind_addr = var("XG_SERVING_BIND_ADDR")
        .and_then(|v| v.parse::<SocketAddr>().ok())
        .unwrap_or_else(default_bind_addr);

    let payload_suffix = var("XG_SERVING_PAYLOAD_SUFFIX")
        .map(|v| v.trim().trim_start_matches('.').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_PAYLOAD_SUFFIX.to_string());

    let default_model = match var("XG_SERVING_DEFAULT_MODEL") {
        Some(v) if v.trim().is_empty() => None,
        Some(v) => Some(v.trim().to_string()),
        None => Some(DEFAULT_MODEL.to_string()),
    };

    let fetch_secs = parse_u64("XG_SERVING_FETCH_TIMEOUT", DEFAULT_FETCH_TIMEOUT_SECS).max(1);
    let workers = parse_usize("XG_SERVING_WORKERS", num_cpus::get()).max(1);
    let max_body_bytes = parse_usize("XG_SERVING_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES).max(1024);

    ServiceConfig {
        bind_addr,
        registry_root: var("XG_SERVING_REGISTRY_ROOT")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRY_ROOT)),
        staging_dir: var("XG_SERVING_STAGING_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR)),
        payload_suffix,
        default_model,
        fetch_timeout: Duration::from_secs(fetch_secs),
        workers,
        max_body_bytes,
        log: load_log_config(),
    }
}

impl ServiceConfig {
    /// Effective values as `KEY=value` lines, in table order.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("XG_SERVING_BIND_ADDR", self.bind_addr.to_string()),
            ("XG_SERVING_REGISTRY_ROOT", self.registry_root.display().to_string()),
            ("XG_SERVING_STAGING_DIR", self.staging_dir.display().to_string()),
            ("XG_SERVING_PAYLOAD_SUFFIX", self.payload_suffix.clone()),
            ("XG_SERVING_DEFAULT_MODEL", self.default_model.clone().unwrap_or_default()),
            ("XG_SERVING_FETCH_TIMEOUT", self.fetch_timeout.as_secs().to_string()),
            ("XG_SERVING_WORKERS", self.workers.to_string()),
            ("XG_SERVING_MAX_BODY_BYTES", self.max_body_bytes.to_string()),
            (
                "XG_SERVING_LOG_FILE",
                self.log.output_path.as_ref().map(|p| p.display().to_string()).unwrap_or_default(),
            ),
            ("XG_SERVING_LOG_LEVEL", self.log.level.clone()),
            (
                "XG_SERVING_LOG_FORMAT",
                match self.log.format {
                    LogFormat::Json => "json".to_string(),
                    LogFormat::Pretty => "pretty".to_string(),
                },
            ),
        ]
    }
}
