//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics endpoint when enabled
//! - Bind the listener and run the HTTP server
//! - Wire OS signals to the shutdown coordinator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::EchoConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http server: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the service until an OS shutdown signal arrives.
pub async fn run(config: EchoConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.http.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.http.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config)
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
