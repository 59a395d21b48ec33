//! Configuration management for the poll gateway

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod loader;
pub mod validation;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which backend implementation the binary wires up
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// The hosted auth/storage service
    #[default]
    Http,
    /// The in-process store; state dies with the process
    Memory,
}

/// Hosted backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend
    pub url: String,

    /// Service role key (secured)
    #[serde(
        default = "empty_secret",
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub service_key: Secret<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub mode: BackendMode,
}

/// Rate limiter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Maximum attempts per key per window
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RateLimitSettings {
    pub fn to_limiter_config(&self) -> crate::middleware::RateLimitConfig {
        crate::middleware::RateLimitConfig {
            max_attempts: self.max_attempts,
            window: Duration::from_secs(self.window_secs),
            enabled: self.enabled,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
            enabled: default_enabled(),
        }
    }
}

/// View-cache invalidation hook
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// Revalidation webhook; `None` disables the signal
    #[serde(default)]
    pub revalidate_url: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_kb")]
    pub max_body_size_kb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            max_body_size_kb: default_max_body_kb(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "json", "compact", or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_timeout() -> u64 {
    30
}
fn default_max_attempts() -> usize {
    5
}
fn default_window_secs() -> u64 {
    60
}
fn default_enabled() -> bool {
    true
}
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    8080
}
fn default_max_body_kb() -> usize {
    64
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, crate::error::ConfigError> {
        let config = loader::load_config(path)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, crate::error::ConfigError> {
        let config = loader::load_config_with_env(path)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Validate this configuration
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        validation::validate_config(self)
    }

    /// Default configuration: in-memory backend, suitable for local runs
    /// and tests without a hosted project.
    pub fn default_config() -> Self {
        Self {
            backend: BackendConfig {
                url: String::new(),
                service_key: empty_secret(),
                timeout_secs: default_timeout(),
                mode: BackendMode::Memory,
            },
            rate_limit: RateLimitSettings::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Custom serializer for Secret<String>
fn serialize_secret<S>(secret: &Secret<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

/// Custom deserializer for Secret<String>
fn deserialize_secret<'de, D>(deserializer: D) -> Result<Secret<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(Secret::new(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn limiter_config_conversion() {
        let settings = RateLimitSettings {
            max_attempts: 3,
            window_secs: 10,
            enabled: true,
        };
        let config = settings.to_limiter_config();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.window, Duration::from_secs(10));
    }
}
