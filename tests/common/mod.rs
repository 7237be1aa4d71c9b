//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fanout_echo::config::EchoConfig;
use fanout_echo::fanout::Dispatcher;
use fanout_echo::http::HttpServer;
use fanout_echo::lifecycle::Shutdown;
use fanout_echo::observability::{RecordingLogger, RecordingTracer};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running server plus the handles a test needs to inspect and stop it.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub tracer: RecordingTracer,
    pub logger: RecordingLogger,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server on an ephemeral local port with recording telemetry.
pub async fn start_server(config: EchoConfig) -> TestServer {
    let tracer = RecordingTracer::new();
    let logger = RecordingLogger::new();
    let dispatcher = Arc::new(Dispatcher::new(
        config.dispatch.clone(),
        Arc::new(tracer.clone()),
        Arc::new(logger.clone()),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_dispatcher(config, dispatcher);
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    // Listener is already bound; give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        shutdown,
        tracer,
        logger,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
