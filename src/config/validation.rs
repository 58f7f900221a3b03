//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the root URL names a gemini host
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::gemini::GEMINI_SCHEME;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no root URL configured")]
    MissingRoot,

    #[error("root URL {0:?} is not a valid URL")]
    InvalidRoot(String),

    #[error("root URL {0:?} must use the gemini scheme")]
    RootScheme(String),

    #[error("root URL {0:?} has no host")]
    RootHost(String),

    #[error("css_path and css_url are mutually exclusive")]
    ConflictingStylesheets,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("{field} {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.upstream.root.as_deref() {
        None => errors.push(ValidationError::MissingRoot),
        Some(root) => match Url::parse(root) {
            Err(_) => errors.push(ValidationError::InvalidRoot(root.to_string())),
            Ok(url) if url.scheme() != GEMINI_SCHEME => {
                errors.push(ValidationError::RootScheme(root.to_string()))
            }
            Ok(url) if url.host_str().map_or(true, str::is_empty) => {
                errors.push(ValidationError::RootHost(root.to_string()))
            }
            Ok(_) => {}
        },
    }

    if config.style.css_path.is_some() && config.style.css_url.is_some() {
        errors.push(ValidationError::ConflictingStylesheets);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if !is_bind_address(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port`, `:port` or a socket address literal. Names are resolved at bind time.
fn is_bind_address(value: &str) -> bool {
    if value.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match value.rsplit_once(':') {
        Some((host, port)) => {
            port.parse::<u16>().is_ok()
                && !host.contains(|c: char| c.is_whitespace() || c == ':')
        }
        None => false,
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
