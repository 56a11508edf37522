//! Metrics facade hooks. No exporter is installed here; counters are
//! no-ops until the embedding process sets a recorder.

use std::time::Duration;

/// Count one prediction request and the rows it scored.
pub fn record_prediction(status: &'static str, rows: usize) {
    ::metrics::counter!("xg_predictions_total", "status" => status).increment(1);
    ::metrics::counter!("xg_prediction_rows_total").increment(rows as u64);
}

/// Count one swap attempt and how long it took.
pub fn record_swap(outcome: &'static str, elapsed: Duration) {
    ::metrics::counter!("xg_swaps_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("xg_swap_duration_seconds").record(elapsed.as_secs_f64());
}
