//! Fan-out/fan-in request processing.
//!
//! # Data Flow
//! ```text
//! Dispatcher::execute(ctx, input, count)
//!     → worker.rs × count (one task per sequence index)
//!         → success queue  (mpsc<String>)
//!         → failure queue  (mpsc<WorkError>)
//!     → supervisor joins all workers, then drops the last senders
//!     → aggregator.rs drains both queues until both are closed
//!     → AggregateResult → (text, Option<CombinedError>)
//! ```
//!
//! # Design Decisions
//! - Every worker produces exactly one outcome; no fail-fast
//! - Each queue's closed state is tracked independently and never reset
//! - Cancellation is ignored unless `honor_cancellation` is enabled

pub mod aggregator;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod outcome;
pub mod worker;

pub use aggregator::{QueueState, ResultAggregator};
pub use context::{cancel_pair, CancelHandle, CancelSignal, Context};
pub use dispatcher::Dispatcher;
pub use error::{CombinedError, WorkError};
pub use outcome::{AggregateResult, WorkOutcome, WorkRequest};
pub use worker::Worker;
