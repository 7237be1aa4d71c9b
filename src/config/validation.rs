//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EchoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::EchoConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &EchoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "http.bind_address",
            format!("'{}' is not a socket address", config.http.bind_address),
        ));
    }
    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new("http.request_timeout_secs", "must be > 0"));
    }
    if config.http.max_body_size == 0 {
        errors.push(ValidationError::new("http.max_body_size", "must be > 0"));
    }
    if config.http.max_count == 0 {
        errors.push(ValidationError::new("http.max_count", "must be > 0"));
    }
    if config.http.default_count > config.http.max_count {
        errors.push(ValidationError::new(
            "http.default_count",
            format!(
                "{} exceeds http.max_count {}",
                config.http.default_count, config.http.max_count
            ),
        ));
    }

    if config.dispatch.work_unit_ms == 0 {
        errors.push(ValidationError::new("dispatch.work_unit_ms", "must be > 0"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
