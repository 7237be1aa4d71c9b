//! Configuration loading from disk and environment.

use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::schema::EchoConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix for environment overrides, e.g. `ECHO_HTTP_BIND_ADDRESS`.
pub const ENV_PREFIX: &str = "ECHO_";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: String, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, message } => write!(f, "Invalid {}: {}", key, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<EchoConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EchoConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Full startup pipeline: file (or defaults), then `ECHO_*` overrides from
/// the process environment, then validation.
pub fn load(path: Option<&Path>) -> Result<EchoConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => EchoConfig::default(),
    };

    apply_env_overrides(&mut config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `ECHO_*` overrides. Unknown keys under the prefix are ignored.
pub fn apply_env_overrides<I, K, V>(config: &mut EchoConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in vars {
        let key = key.as_ref();
        let value = value.as_ref();
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        match name {
            "HTTP_BIND_ADDRESS" => config.http.bind_address = value.to_string(),
            "HTTP_DEFAULT_COUNT" => config.http.default_count = parse_env(key, value)?,
            "HTTP_MAX_COUNT" => config.http.max_count = parse_env(key, value)?,
            "DISPATCH_FAILURE_THRESHOLD" => {
                config.dispatch.failure_threshold = parse_env(key, value)?
            }
            "DISPATCH_WORK_UNIT_MS" => config.dispatch.work_unit_ms = parse_env(key, value)?,
            "DISPATCH_HONOR_CANCELLATION" => {
                config.dispatch.honor_cancellation = parse_env(key, value)?
            }
            "OBSERVABILITY_LOG_LEVEL" => config.observability.log_level = value.to_string(),
            "OBSERVABILITY_LOG_FORMAT" => {
                config.observability.log_format = parse_env(key, value)?
            }
            "OBSERVABILITY_TRACING_ENABLED" => {
                config.observability.tracing_enabled = parse_env(key, value)?
            }
            "OBSERVABILITY_METRICS_ENABLED" => {
                config.observability.metrics_enabled = parse_env(key, value)?
            }
            _ => tracing::debug!(key = %key, "Ignoring unknown config override"),
        }
    }
    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Env {
        key: key.to_string(),
        message: format!("'{}': {}", value, e),
    })
}
