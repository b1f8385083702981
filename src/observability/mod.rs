//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via the `metrics` facade)
//!
//! Consumers:
//!     → stderr (fmt subscriber, filtered by RUST_LOG or config)
//!     → any `metrics` recorder installed by an embedding application
//! ```
//!
//! # Design Decisions
//! - Key material and passwords are never logged
//! - Transaction hash flows through every log line after broadcast
//! - Counters are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
