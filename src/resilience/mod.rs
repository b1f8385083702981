//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the network API:
//!     → timeouts.rs (enforce per-request deadline)
//!     → On transient failure of a read: retries.rs (retry with backoff.rs delays)
//!     → Broadcasts: single attempt, failure surfaced verbatim
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries only for idempotent reads (account, tokens, query)
//! - Never retry a broadcast: the first attempt may have been accepted

pub mod backoff;
pub mod retries;
pub mod timeouts;
