//! Configuration module
//!
//! Loaded from TOML. Every section falls back to defaults, so an empty file
//! (or no file at all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::version::OicpVersion;
use crate::support::errors::ConfigError;
use crate::support::retry::RetryConfig;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "OICP_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Outbound (client) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the remote roaming platform
    pub base_url: String,
    /// Protocol version spoken to the remote side
    pub version: OicpVersion,
    /// Default round-trip timeout when a request carries no override
    pub request_timeout_secs: u64,
    /// Upper bound on concurrently open connections
    pub max_connections: usize,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://service.hubject.com".to_string(),
            version: OicpVersion::V2_3,
            request_timeout_secs: 60,
            max_connections: 16,
            retry: RetryConfig::default(),
        }
    }
}

/// Inbound (server) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub version: OicpVersion,
    /// How long in-flight requests may take to drain on shutdown
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            version: OicpVersion::V2_3,
            shutdown_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Load from `OICP_CONFIG` or the default location; a missing file
    /// yields the defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);

        match path {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "Loading configuration");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "client.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.client.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "client.max_connections must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// `~/.config/oicp-roaming/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("oicp-roaming").join("config.toml"))
}
