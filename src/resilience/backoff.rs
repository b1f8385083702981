//! Delays between retried API reads.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Delays for the retries of one read, in order.
///
/// Yields `max_attempts - 1` delays. Retry `n` waits between half and all of
/// `base_delay_ms * 2^n`, capped at `max_delay_ms`.
#[derive(Debug, Clone)]
pub struct ReadBackoff {
    base_ms: u64,
    max_ms: u64,
    retries_left: u32,
    step: u32,
}

impl ReadBackoff {
    pub fn new(policy: &RetryConfig) -> Self {
        Self {
            base_ms: policy.base_delay_ms,
            max_ms: policy.max_delay_ms,
            retries_left: policy.max_attempts.saturating_sub(1),
            step: 0,
        }
    }

    fn ceiling(&self) -> u64 {
        self.base_ms
            .saturating_mul(2u64.saturating_pow(self.step))
            .min(self.max_ms)
    }
}

impl Iterator for ReadBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;

        let ceiling = self.ceiling();
        self.step = self.step.saturating_add(1);
        let floor = ceiling / 2;
        let jitter = rand::thread_rng().gen_range(0..=ceiling - floor);
        Some(Duration::from_millis(floor + jitter))
    }
}
