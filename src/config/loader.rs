//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::PipelineConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV_VAR: &str = "MVX_PIPELINE_CONFIG";

/// File picked up from the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Every semantic problem found, not just the first.
    #[error("invalid configuration: {}", list(.0))]
    Validation(Vec<ValidationError>),
}

fn list(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse TOML text, fill unset fields with defaults and validate.
pub fn parse_config(content: &str) -> Result<PipelineConfig, ConfigError> {
    let config: PipelineConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the configuration for this run.
///
/// Order: `$MVX_PIPELINE_CONFIG`, then `./pipeline.toml` if present, then
/// validated defaults.
pub fn load_from_env() -> Result<PipelineConfig, ConfigError> {
    match config_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            load_config(&path)
        }
        None => {
            tracing::info!("No configuration file, using devnet defaults");
            let config = PipelineConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}
