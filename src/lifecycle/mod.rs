//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Metrics → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then telemetry, then listeners
//! - Shutdown has timeout: draining is abandoned after the deadline
//! - The shutdown signal doubles as the cancellation source for requests

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
