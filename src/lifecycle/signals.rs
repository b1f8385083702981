//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for Ctrl-C (SIGINT)
//! - Translate it into a [`Shutdown`] trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A run interrupted before broadcast has no network side effect; after
//!   broadcast the transaction is already out, so only the wait is cut short

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task that triggers `shutdown` on the first Ctrl-C.
pub fn spawn_interrupt_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, aborting run");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}
