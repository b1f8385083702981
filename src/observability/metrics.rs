//! Pipeline metrics.
//!
//! # Metrics
//! - `pipeline_transactions_broadcast_total` (counter): accepted broadcasts by operation
//! - `pipeline_transactions_rejected_total` (counter): rejected broadcasts by operation
//! - `pipeline_outcome_polls_total` (counter): status polls by observed status
//! - `pipeline_outcomes_total` (counter): resolutions by terminal state
//! - `pipeline_read_retries_total` (counter): retried API reads by operation

use metrics::counter;

pub fn record_broadcast(operation: &'static str) {
    counter!("pipeline_transactions_broadcast_total", "operation" => operation).increment(1);
}

pub fn record_rejection(operation: &'static str) {
    counter!("pipeline_transactions_rejected_total", "operation" => operation).increment(1);
}

pub fn record_poll(status: &'static str) {
    counter!("pipeline_outcome_polls_total", "status" => status).increment(1);
}

pub fn record_resolution(state: &'static str) {
    counter!("pipeline_outcomes_total", "state" => state).increment(1);
}

pub fn record_retry(operation: &str) {
    counter!("pipeline_read_retries_total", "operation" => operation.to_string()).increment(1);
}
