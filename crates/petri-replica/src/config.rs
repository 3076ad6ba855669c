//! Configuration loading and typed config structures for a session.
//!
//! The canonical configuration lives in `petri.yaml` at the project root.
//! This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::path::Path;

use serde::Deserialize;

use crate::checkpoint::DEFAULT_CHECKPOINT_CAPACITY;

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

/// Top-level session configuration.
///
/// Mirrors the structure of `petri.yaml`. All fields have defaults, so an
/// empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Grid dimensions.
    #[serde(default)]
    pub grid: GridConfig,

    /// Replication parameters.
    #[serde(default)]
    pub replication: ReplicationConfig,

    /// Tick-loop parameters.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SessionConfig {
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

/// Grid dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Number of columns.
    #[serde(default = "default_grid_width")]
    pub width: usize,

    /// Number of rows.
    #[serde(default = "default_grid_height")]
    pub height: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_width(),
            height: default_grid_height(),
        }
    }
}

/// Replication parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplicationConfig {
    /// Number of checkpoints the host retains for rollback.
    #[serde(default = "default_checkpoint_capacity")]
    pub checkpoint_capacity: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            checkpoint_capacity: default_checkpoint_capacity(),
        }
    }
}

/// Tick-loop parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Whether the simulation starts running or paused at step 0.
    #[serde(default = "default_true")]
    pub simulation_enabled: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            simulation_enabled: true,
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

const fn default_grid_width() -> usize {
    100
}

const fn default_grid_height() -> usize {
    60
}

const fn default_checkpoint_capacity() -> usize {
    DEFAULT_CHECKPOINT_CAPACITY
}

const fn default_tick_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SessionConfig::default();
        assert_eq!(config.grid.width, 100);
        assert_eq!(config.grid.height, 60);
        assert_eq!(config.replication.checkpoint_capacity, 8);
        assert_eq!(config.run.tick_interval_ms, 50);
        assert!(config.run.simulation_enabled);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
grid:
  width: 40
  height: 30

replication:
  checkpoint_capacity: 16

run:
  tick_interval_ms: 25
  max_ticks: 1000
  simulation_enabled: false

logging:
  level: "debug"
"#;
        let config = SessionConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.grid.width, 40);
        assert_eq!(config.grid.height, 30);
        assert_eq!(config.replication.checkpoint_capacity, 16);
        assert_eq!(config.run.tick_interval_ms, 25);
        assert_eq!(config.run.max_ticks, 1000);
        assert!(!config.run.simulation_enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "grid:\n  width: 12\n";
        let config = SessionConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Width is overridden, everything else uses defaults.
        assert_eq!(config.grid.width, 12);
        assert_eq!(config.grid.height, 60);
        assert_eq!(config.run.max_ticks, 0);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SessionConfig::parse("").is_ok());
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = SessionConfig::parse("grid: [not, a, mapping]");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
