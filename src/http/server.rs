//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the echo handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Serve until shutdown, then drain with a deadline

use std::future::IntoFuture;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{EchoConfig, HttpConfig};
use crate::fanout::{CancelSignal, Dispatcher};
use crate::http::echo::echo_handler;
use crate::http::request::UuidRequestId;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub http: HttpConfig,
    /// Cancellation source threaded into every request context.
    pub cancel: CancelSignal,
}

/// HTTP front end for the dispatcher.
pub struct HttpServer {
    config: EchoConfig,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Create a server whose dispatcher reports through `tracing`.
    pub fn new(config: EchoConfig) -> Self {
        let dispatcher = Arc::new(Dispatcher::with_tracing(
            config.dispatch.clone(),
            config.observability.tracing_enabled,
        ));
        Self::with_dispatcher(config, dispatcher)
    }

    pub fn with_dispatcher(config: EchoConfig, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self, cancel: CancelSignal) -> Router {
        let state = AppState {
            dispatcher: self.dispatcher.clone(),
            http: self.config.http.clone(),
            cancel,
        };

        Router::new()
            .route("/echo", post(echo_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(self.config.http.max_body_size))
                    .layer(TimeoutLayer::new(self.config.http.request_timeout())),
            )
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight
    /// requests for at most `shutdown_timeout_secs`.
    pub async fn run(self, listener: TcpListener, shutdown: CancelSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router(shutdown.clone()).into_make_service();
        let drain_timeout = self.config.http.shutdown_timeout();

        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        let mut graceful = shutdown;
        let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
            graceful.cancelled().await;
            tracing::info!("HTTP server draining");
            let _ = draining_tx.send(());
        });

        let deadline = async move {
            if draining_rx.await.is_ok() {
                tokio::time::sleep(drain_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            res = serve.into_future() => res?,
            _ = deadline => {
                tracing::warn!(
                    timeout_secs = drain_timeout.as_secs(),
                    "Drain deadline exceeded, dropping in-flight requests"
                );
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
