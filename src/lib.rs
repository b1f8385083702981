//! Client-side transaction lifecycle pipeline for MultiversX.
//!
//! Operation descriptor → unsigned transaction → canonical signing bytes →
//! Ed25519 signature → broadcast → bounded polling → parsed outcome.

// Core subsystems
pub mod blockchain;
pub mod factory;
pub mod outcome;
pub mod pipeline;

// Surfaces
pub mod commands;
pub mod config;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::PipelineConfig;
pub use lifecycle::Shutdown;
pub use pipeline::{Pipeline, RunReport};
