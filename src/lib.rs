//! Concurrent fan-out/fan-in echo service.

pub mod config;
pub mod fanout;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::EchoConfig;
pub use fanout::{AggregateResult, CombinedError, Context, Dispatcher, WorkError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
