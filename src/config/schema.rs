//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive `Deserialize` from config files.

use std::time::Duration;

use serde::Deserialize;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EchoConfig {
    /// HTTP listener and request handling.
    pub http: HttpConfig,

    /// Fan-out worker behaviour.
    pub dispatch: DispatchConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Time allowed for in-flight requests to drain on shutdown.
    pub shutdown_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Worker count used when the request carries no `count`.
    pub default_count: usize,

    /// Largest accepted `count`.
    pub max_count: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            shutdown_timeout_secs: 10,
            max_body_size: 1024 * 1024, // 1MB
            default_count: 5,
            max_count: 10_000,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Fan-out configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Sequence indices above this value fail with a timeout.
    pub failure_threshold: usize,

    /// One unit of synthetic work in milliseconds; worker `n` sleeps `n + 1` units.
    pub work_unit_ms: u64,

    /// Abort in-flight work when the request context is cancelled.
    pub honor_cancellation: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 10,
            work_unit_ms: 1,
            honor_cancellation: false,
        }
    }
}

impl DispatchConfig {
    pub fn work_unit(&self) -> Duration {
        Duration::from_millis(self.work_unit_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "console" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name reported in startup logs.
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Include source file and line in log records.
    pub log_caller: bool,

    /// Emit dispatch and worker spans. Logging is unaffected.
    pub tracing_enabled: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "fanout-echo".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            log_caller: false,
            tracing_enabled: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
