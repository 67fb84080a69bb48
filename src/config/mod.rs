//! Configuration loading and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::game::rules::SimulationRules;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Playoff configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayoffConfig {
    /// Length of every series, an odd number of games
    #[serde(default = "default_best_of")]
    pub best_of: u8,
}

fn default_best_of() -> u8 {
    7
}

impl Default for PlayoffConfig {
    fn default() -> Self {
        Self {
            best_of: default_best_of(),
        }
    }
}

/// Main league configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub simulation: SimulationRules,

    #[serde(default)]
    pub playoffs: PlayoffConfig,
}

fn default_database_url() -> String {
    "sqlite://league.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            log_level: default_log_level(),
            simulation: SimulationRules::default(),
            playoffs: PlayoffConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match path.exists() {
            true => Self::from_file(path),
            false => Ok(Self::default()),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "database_url must not be empty".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.playoffs.best_of == 0 || self.playoffs.best_of % 2 == 0 {
            return Err(ConfigError::ValidationError(format!(
                "playoffs.best_of must be an odd number, got {}",
                self.playoffs.best_of
            )));
        }

        self.simulation
            .validate()
            .map_err(ConfigError::ValidationError)
    }
}
