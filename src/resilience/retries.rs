//! Retry logic.
//!
//! # Responsibilities
//! - Retry idempotent reads that failed transiently
//! - Execute retries with exponential backoff + jitter
//!
//! # Design Decisions
//! - Only [`BlockchainError::is_transient`] failures are retried
//! - Callers decide what is idempotent; broadcasts never come through here

use std::future::Future;

use crate::blockchain::types::BlockchainResult;
use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::ReadBackoff;

/// Run `op` until it succeeds, fails permanently, or attempts run out.
pub async fn retry_read<T, F, Fut>(policy: &RetryConfig, operation: &str, mut op: F) -> BlockchainResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BlockchainResult<T>>,
{
    let mut delays = ReadBackoff::new(policy);
    let mut attempt = 1u32;
    loop {
        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => e,
            Err(e) => return Err(e),
        };
        let delay = match delays.next() {
            Some(delay) => delay,
            None => return Err(error),
        };
        tracing::warn!(
            operation = operation,
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Read failed, retrying"
        );
        metrics::record_retry(operation);
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
