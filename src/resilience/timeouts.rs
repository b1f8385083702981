//! Timeout enforcement.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Run `fut` with a deadline, mapping expiry to [`BlockchainError::Timeout`].
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> BlockchainResult<T>
where
    F: Future<Output = BlockchainResult<T>>,
{
    match timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(BlockchainError::Timeout(duration.as_secs())),
    }
}
