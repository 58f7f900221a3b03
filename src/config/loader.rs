//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML file without validating it.
///
/// Use this when command-line overrides are applied before validation.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let file = format!("gemini-gateway-{}-{}", std::process::id(), name);
        let path = std::env::temp_dir().join(file);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = write_temp("valid.toml", "[upstream]\nroot = \"gemini://example.org\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.upstream.root.as_deref(), Some("gemini://example.org"));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let path = write_temp("invalid.toml", "[timeouts]\nrequest_secs = 0\n");
        let err = load_config(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no root URL configured"), "{message}");
        assert!(message.contains("timeouts.request_secs"), "{message}");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_parse_error() {
        let path = write_temp("broken.toml", "[upstream\nroot = 1");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/gateway.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
