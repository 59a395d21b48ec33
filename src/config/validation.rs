//! Configuration validation

use super::{BackendMode, Config};
use crate::error::ConfigError;
use secrecy::ExposeSecret;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_backend(config)?;
    validate_rate_limit(config)?;
    validate_server(config)?;
    Ok(())
}

fn validate_backend(config: &Config) -> Result<(), ConfigError> {
    if config.backend.mode == BackendMode::Memory {
        // the in-process store needs no connection settings
        return Ok(());
    }

    if config.backend.url.is_empty() {
        return Err(ConfigError::Invalid(
            "backend URL is required".to_string(),
        ));
    }

    if !config.backend.url.starts_with("http://") && !config.backend.url.starts_with("https://") {
        return Err(ConfigError::Invalid(
            "backend URL must start with http:// or https://".to_string(),
        ));
    }

    if config.backend.service_key.expose_secret().is_empty() {
        return Err(ConfigError::Invalid(
            "backend service key is required".to_string(),
        ));
    }

    if config.backend.timeout_secs == 0 || config.backend.timeout_secs > 300 {
        return Err(ConfigError::Invalid(
            "backend timeout must be between 1 and 300 seconds".to_string(),
        ));
    }

    Ok(())
}

fn validate_rate_limit(config: &Config) -> Result<(), ConfigError> {
    if config.rate_limit.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "rate limit max_attempts must be greater than 0".to_string(),
        ));
    }

    if config.rate_limit.window_secs == 0 {
        return Err(ConfigError::Invalid(
            "rate limit window must be greater than 0 seconds".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ConfigError> {
    if config.server.max_body_size_kb == 0 {
        return Err(ConfigError::Invalid(
            "server max_body_size_kb must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, Config};
    use secrecy::Secret;

    fn http_config() -> Config {
        let mut config = Config::default_config();
        config.backend = BackendConfig {
            url: "https://project.example.co".to_string(),
            service_key: Secret::new("key-123".to_string()),
            timeout_secs: 30,
            mode: BackendMode::Http,
        };
        config
    }

    #[test]
    fn http_mode_requires_url_and_key() {
        let mut config = http_config();
        assert!(validate_config(&config).is_ok());

        config.backend.url.clear();
        assert!(validate_config(&config).is_err());

        let mut config = http_config();
        config.backend.service_key = Secret::new(String::new());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn memory_mode_needs_no_connection_settings() {
        let config = Config::default_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_rate_limit_settings_rejected() {
        let mut config = Config::default_config();
        config.rate_limit.max_attempts = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default_config();
        config.rate_limit.window_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
