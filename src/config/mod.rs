//! Configuration module for ServerEye
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SERVEREYE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use servereye::config::ServerEyeConfig;
//!
//! let config = ServerEyeConfig::default();
//! assert_eq!(config.stream.reconnect_delay_ms, 3000);
//!
//! let toml = r#"
//! [api]
//! base_url = "http://monitor.local:8000"
//! "#;
//! let config: ServerEyeConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.api.base_url, "http://monitor.local:8000");
//! ```

pub mod api;
pub mod error;
pub mod logging;

pub use api::ApiConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

pub use crate::store::StoreConfig;
pub use crate::stream::StreamConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Session file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Persist the token and preferences between runs
    pub persist: bool,
    /// Session file location; defaults to the user config directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persist: true,
            path: None,
        }
    }
}

/// Unified configuration for the ServerEye live client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerEyeConfig {
    /// REST backend settings
    pub api: ApiConfig,
    /// Live event stream settings
    pub stream: StreamConfig,
    /// Dashboard store settings
    pub store: StoreConfig,
    /// Session persistence
    pub session: SessionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServerEyeConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports SERVEREYE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SERVEREYE_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(token) = std::env::var("SERVEREYE_TOKEN") {
            if !token.is_empty() {
                self.api.token = Some(token);
            }
        }

        if let Ok(level) = std::env::var("SERVEREYE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SERVEREYE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(stream) = std::env::var("SERVEREYE_STREAM") {
            self.stream.enabled = stream.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Validation {
                field: "api.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if !["http://", "https://", "ws://", "wss://"]
            .iter()
            .any(|scheme| base.starts_with(scheme))
        {
            return Err(ConfigError::Validation {
                field: "api.base_url".to_string(),
                message: format!("unsupported scheme in '{}'", base),
            });
        }

        if let Some(component) = self.logging.unknown_component() {
            return Err(ConfigError::Validation {
                field: format!("logging.component_levels.{}", component),
                message: format!(
                    "unknown module, expected one of: {}",
                    logging::COMPONENTS.join(", ")
                ),
            });
        }

        if !(1..=api::MAX_SERVER_PAGE_SIZE).contains(&self.api.server_page_size) {
            return Err(ConfigError::Validation {
                field: "api.server_page_size".to_string(),
                message: format!(
                    "page size must be between 1 and {}",
                    api::MAX_SERVER_PAGE_SIZE
                ),
            });
        }

        if self.stream.reconnect_delay_ms == 0 {
            return Err(ConfigError::Validation {
                field: "stream.reconnect_delay_ms".to_string(),
                message: "reconnect delay must be non-zero".to_string(),
            });
        }

        if self.store.alert_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "store.alert_capacity".to_string(),
                message: "alert capacity must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
