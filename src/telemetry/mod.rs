//! Telemetry: structured logging, request spans, and metrics hooks.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, read_log, LogConfig, LogError, LogFormat, NO_LOGS_PLACEHOLDER};
pub use self::metrics::{record_prediction, record_swap};
pub use spans::{RequestSpan, SpanExt};
