//! Bounded polling of a broadcast transaction until the network reports it
//! as executed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::network::{NetworkProvider, TransactionOnNetwork};
use crate::blockchain::types::TxHash;
use crate::config::WatcherConfig;
use crate::observability::metrics;

/// How a watch ended.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The network reports a final status (success, fail or invalid).
    Executed(TransactionOnNetwork),
    /// The deadline passed first. The transaction may still execute later.
    TimedOut {
        hash: TxHash,
        waited: Duration,
        /// Last transient error seen while polling, if any.
        last_error: Option<String>,
    },
}

/// Polls a transaction at a fixed interval within an overall deadline.
pub struct TransactionWatcher {
    network: Arc<dyn NetworkProvider>,
    poll_interval: Duration,
    timeout: Duration,
}

impl TransactionWatcher {
    pub fn new(network: Arc<dyn NetworkProvider>, config: &WatcherConfig) -> Self {
        Self::with_durations(
            network,
            Duration::from_millis(config.poll_interval_ms),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_durations(
        network: Arc<dyn NetworkProvider>,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            network,
            poll_interval,
            timeout,
        }
    }

    /// Wait until `hash` reaches a final status or the deadline passes.
    ///
    /// Unknown transactions and failed polls count as "still pending"; the
    /// watch never fails, it either resolves or times out.
    pub async fn await_completed(&self, hash: &TxHash) -> Resolution {
        let started = Instant::now();
        let mut last_error: Option<String> = None;

        let result = timeout(self.timeout, async {
            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match self.network.get_transaction(hash).await {
                    Ok(Some(tx)) if tx.status.is_completed() => {
                        metrics::record_poll(tx.status.as_str());
                        return tx;
                    }
                    Ok(Some(tx)) => {
                        metrics::record_poll(tx.status.as_str());
                        tracing::debug!(tx_hash = %hash, status = %tx.status, "Transaction pending");
                    }
                    Ok(None) => {
                        metrics::record_poll("unknown");
                        tracing::debug!(tx_hash = %hash, "Transaction not yet known");
                    }
                    Err(e) => {
                        metrics::record_poll("error");
                        tracing::warn!(tx_hash = %hash, error = %e, "Status poll failed");
                        last_error = Some(e.to_string());
                    }
                }
            }
        })
        .await;

        match result {
            Ok(tx) => {
                tracing::info!(tx_hash = %hash, status = %tx.status, "Transaction executed");
                metrics::record_resolution(tx.status.as_str());
                Resolution::Executed(tx)
            }
            Err(_) => {
                tracing::warn!(
                    tx_hash = %hash,
                    timeout_secs = self.timeout.as_secs(),
                    "Gave up waiting for transaction"
                );
                metrics::record_resolution("timeout");
                Resolution::TimedOut {
                    hash: hash.clone(),
                    waited: started.elapsed(),
                    last_error,
                }
            }
        }
    }
}
