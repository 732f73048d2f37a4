//! Configuration loading and typed config structures for the scheduler.
//!
//! The canonical configuration lives in `armada-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure and provides a loader that reads the file. Every field has a
//! default, so a missing file or an empty document yields a usable
//! configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level scheduler configuration.
///
/// Mirrors the structure of `armada-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchedulerConfig {
    /// Time-scale settings applied to the clock at startup.
    #[serde(default)]
    pub time: TimeScaleConfig,

    /// Host loop settings (tick cadence and run bounds).
    #[serde(default)]
    pub host: HostConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SchedulerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Time-scale settings applied to the clock at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeScaleConfig {
    /// Initial game-speed multiplier (must be finite and > 0).
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Whether the simulation starts paused.
    #[serde(default)]
    pub start_paused: bool,
}

impl Default for TimeScaleConfig {
    fn default() -> Self {
        Self {
            multiplier: default_multiplier(),
            start_paused: false,
        }
    }
}

/// Host loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    /// Real-time milliseconds between tick pulses.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Maximum number of ticks before the host stops (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_multiplier() -> f64 {
    1.0
}

const fn default_tick_interval_ms() -> u64 {
    16
}

fn default_log_level() -> String {
    "info".to_owned()
}
