//! fanout-echo server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌────────────────────────────────────────────────┐
//!                         │                  FANOUT-ECHO                   │
//!                         │                                                │
//!   POST /echo?count=N    │  ┌────────┐    ┌────────────┐    ┌──────────┐  │
//!   ──────────────────────┼─▶│  http  │───▶│ dispatcher │───▶│ worker×N │  │
//!                         │  │ server │    └────────────┘    └────┬─────┘  │
//!                         │  └────────┘                           │        │
//!                         │       ▲                    success / failure   │
//!                         │       │                       queues  │        │
//!   text | error          │       │        ┌────────────┐         │        │
//!   ◀─────────────────────┼───────┴────────│ aggregator │◀────────┘        │
//!                         │                └────────────┘                  │
//!                         │                                                │
//!                         │  config · observability · lifecycle           │
//!                         └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use fanout_echo::config;
use fanout_echo::lifecycle::startup;
use fanout_echo::observability::logging;

#[derive(Parser)]
#[command(name = "fanout-echo")]
#[command(about = "Concurrent fan-out/fan-in echo service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = config::load(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        service = %config.observability.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "starting"
    );
    tracing::info!(
        bind_address = %config.http.bind_address,
        default_count = config.http.default_count,
        failure_threshold = config.dispatch.failure_threshold,
        honor_cancellation = config.dispatch.honor_cancellation,
        tracing_enabled = config.observability.tracing_enabled,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
