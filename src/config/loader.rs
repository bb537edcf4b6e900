use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::{Config, DispatchPolicyKind};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/statebridge/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("statebridge").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The push buffer and request timeout are non-zero
    /// - An allow-list policy names at least one intent type
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.push_capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "bridge.push_capacity must be greater than 0".to_string(),
            });
        }

        if self.bridge.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "bridge.request_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.bridge.dispatch_policy == DispatchPolicyKind::AllowList
            && self.bridge.allowed_intents.is_empty()
        {
            return Err(ConfigError::ValidationError {
                message: "bridge.dispatch_policy = \"allow_list\" requires allowed_intents"
                    .to_string(),
            });
        }

        Ok(())
    }
}
