//! Configuration loader with environment variable support

use super::Config;
use crate::error::ConfigError;
use config::{Environment, File};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(File::from(path.as_ref()))
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Load configuration from a TOML file with environment variable overrides
/// (`POLL_GATEWAY__BACKEND__SERVICE_KEY=...` etc.)
pub fn load_config_with_env<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(File::from(path.as_ref()))
        .add_source(
            Environment::with_prefix("POLL_GATEWAY")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendMode;
    use std::io::Write;

    #[test]
    fn loads_a_minimal_file() {
        let mut file = tempfile_in_target();
        writeln!(
            file.1,
            r#"
[backend]
url = "https://project.example.co"
service_key = "key-123"

[rate_limit]
max_attempts = 3
"#
        )
        .unwrap();

        let config = load_config(&file.0).unwrap();
        assert_eq!(config.backend.url, "https://project.example.co");
        assert_eq!(config.backend.mode, BackendMode::Http);
        assert_eq!(config.rate_limit.max_attempts, 3);
        // unspecified sections fall back to defaults
        assert_eq!(config.server.port, 8080);

        std::fs::remove_file(&file.0).ok();
    }

    fn tempfile_in_target() -> (std::path::PathBuf, std::fs::File) {
        let path = std::env::temp_dir().join(format!(
            "poll-gateway-config-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let file = std::fs::File::create(&path).unwrap();
        (path, file)
    }
}
