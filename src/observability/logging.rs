//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber for the service binary
//! - Define the `Logger` collaborator consumed by the fanout core
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - JSON format for production, pretty format for development
//! - The core only sees `Logger`; the subscriber is a binary concern

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing_subscriber::util::TryInitError;

use crate::config::{LogFormat, ObservabilityConfig};
use crate::observability::attribute::{Fields, KeyValue};

/// Structured logger collaborator.
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str, attrs: &[KeyValue]);

    fn debug(&self, message: &str, attrs: &[KeyValue]) {
        self.log(Level::DEBUG, message, attrs);
    }

    fn info(&self, message: &str, attrs: &[KeyValue]) {
        self.log(Level::INFO, message, attrs);
    }

    fn error(&self, message: &str, attrs: &[KeyValue]) {
        self.log(Level::ERROR, message, attrs);
    }
}

/// Logger that forwards to `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, attrs: &[KeyValue]) {
        let fields = Fields::from_attrs(attrs);
        if level == Level::ERROR {
            keyed_event!(Level::ERROR, fields, message);
        } else if level == Level::WARN {
            keyed_event!(Level::WARN, fields, message);
        } else if level == Level::INFO {
            keyed_event!(Level::INFO, fields, message);
        } else if level == Level::DEBUG {
            keyed_event!(Level::DEBUG, fields, message);
        } else {
            keyed_event!(Level::TRACE, fields, message);
        }
    }
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(config.log_caller)
                    .with_line_number(config.log_caller),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(config.log_caller)
                    .with_line_number(config.log_caller),
            )
            .try_init(),
    }
}
