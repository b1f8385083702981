//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! $MVX_PIPELINE_CONFIG | ./pipeline.toml | defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PipelineConfig (validated, immutable)
//!     → passed explicitly into the pipeline and command mapping
//! ```
//!
//! # Design Decisions
//! - Config is read once per process; there is no persisted state between runs
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets (the key file password) stay in the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::PipelineConfig;
pub use schema::{GasConfig, NetworkConfig, RetryConfig, WatcherConfig};
