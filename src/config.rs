//! Configuration System
//!
//! Layered configuration: built-in defaults, the user config file, an optional
//! explicit file, then `SCENE_REPLAY__*` environment variables.

use crate::error::EngineError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::environment::ENV_PREFIX;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Ingest incrementally when the loader supports it.
    #[serde(default)]
    pub progressive: bool,

    /// Per-tick parse budget in progressive mode; unbounded when absent.
    #[serde(default)]
    pub max_parse_duration_ms: Option<u64>,

    /// Bytes read per progressive chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Scratch directory for extracted media.
    #[serde(default)]
    pub cache_directory: Option<PathBuf>,
}

fn default_chunk_size() -> usize {
    4096
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            progressive: false,
            max_parse_duration_ms: None,
            chunk_size: default_chunk_size(),
            cache_directory: None,
        }
    }
}

/// One-shot readiness polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Minimum spacing between two size observations of a source with unknown size.
    #[serde(default = "default_stability_interval_ms")]
    pub stability_interval_ms: u64,
}

fn default_stability_interval_ms() -> u64 {
    1000
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            stability_interval_ms: default_stability_interval_ms(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Loader(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Loader(msg) => write!(f, "Loader: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ReplayConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.loader.chunk_size == 0 {
            errors.push(ValidationError::Loader(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.loader.max_parse_duration_ms == Some(0) {
            errors.push(ValidationError::Loader(
                "max_parse_duration_ms must be greater than zero when set".to_string(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "json" | "text") {
            errors.push(ValidationError::Logging(format!(
                "unknown format '{}'",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr" | "file") {
            errors.push(ValidationError::Logging(format!(
                "unknown output '{}'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }
}

/// Builds a [`ReplayConfig`] from all sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, user file and environment.
    pub fn load() -> Result<ReplayConfig, EngineError> {
        Self::load_with(None)
    }

    /// Defaults, user file, `path`, then environment.
    pub fn load_from_file(path: &Path) -> Result<ReplayConfig, EngineError> {
        Self::load_with(Some(path))
    }

    pub fn user_config_path() -> Option<PathBuf> {
        sources::user_file::user_config_path()
    }

    fn load_with(explicit: Option<&Path>) -> Result<ReplayConfig, EngineError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::user_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = sources::explicit_file::add_to_builder(builder, path)?;
        }
        builder = sources::environment::add_to_builder(builder);

        let config: ReplayConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            EngineError::Config(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(config)
    }
}
