//! `Keystat` Configuration Module
//!
//! Sampling settings come from `keystat.toml`, environment variables and
//! runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (API)
//! 2. Environment variables (`KEYSTAT_*`, sections separated by `__`)
//! 3. Configuration file (`keystat.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Recommended number of retained samples per index.
pub const DEFAULT_MAX_SAMPLES: usize = 24;

/// Upper bound accepted for `sampling.max_samples`.
pub const MAX_SAMPLES_LIMIT: usize = 65_536;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Sampling granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMode {
    /// Samples carry counters for every column prefix (default).
    #[default]
    PerColumn,
    /// Legacy mode: only the leading column is sampled and reported.
    Leading,
}

impl SampleMode {
    /// Returns true when samples track per-column granularity.
    #[must_use]
    pub fn tracks_columns(&self) -> bool {
        matches!(self, Self::PerColumn)
    }
}

/// Sampling configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Maximum number of samples retained per index.
    pub max_samples: usize,
    /// Sampling granularity.
    pub mode: SampleMode,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            mode: SampleMode::PerColumn,
        }
    }
}

/// Main `Keystat` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatsConfig {
    /// Sampling configuration.
    pub sampling: SamplingConfig,
}

impl StatsConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("keystat.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("KEYSTAT_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = self.sampling.max_samples;
        if max == 0 || max > MAX_SAMPLES_LIMIT {
            return Err(ConfigError::InvalidValue {
                key: "sampling.max_samples".to_string(),
                message: format!("value {max} is out of range [1, {MAX_SAMPLES_LIMIT}]"),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
