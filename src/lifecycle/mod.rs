//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Pipeline checks the trigger before broadcast → abort without side effect
//!     Watcher stops waiting → run reports the hash as submitted
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
