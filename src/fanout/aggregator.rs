//! Fan-in of the two completion queues.
//!
//! # Responsibilities
//! - Drain the success and failure queues concurrently
//! - Append successes in arrival order, fold failures into one error
//! - Finish only after both queues have been observed closed
//!
//! # Design Decisions
//! - One `select!` per iteration, one item or one closure handled per wake
//! - Per-queue state is persistent: once `Closed` the branch is disabled
//!   and never re-polled, and termination requires both to be `Closed`

use tokio::sync::mpsc;

use crate::fanout::context::CancelSignal;
use crate::fanout::error::WorkError;
use crate::fanout::outcome::AggregateResult;

/// Lifecycle of one completion queue. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Open,
    Closed,
}

impl QueueState {
    pub fn is_open(self) -> bool {
        self == QueueState::Open
    }
}

pub struct ResultAggregator {
    outputs: mpsc::Receiver<String>,
    failures: mpsc::Receiver<WorkError>,
    outputs_state: QueueState,
    failures_state: QueueState,
    expected: usize,
    result: AggregateResult,
}

impl ResultAggregator {
    pub fn new(
        outputs: mpsc::Receiver<String>,
        failures: mpsc::Receiver<WorkError>,
        expected: usize,
    ) -> Self {
        Self {
            outputs,
            failures,
            outputs_state: QueueState::Open,
            failures_state: QueueState::Open,
            expected,
            result: AggregateResult {
                outputs: Vec::with_capacity(expected),
                error: None,
            },
        }
    }

    pub fn is_done(&self) -> bool {
        self.outputs_state == QueueState::Closed && self.failures_state == QueueState::Closed
    }

    /// Drain until both queues close.
    ///
    /// With `cancel` set, stops early once it fires and returns the partial
    /// aggregate with a `DispatchCancelled` failure merged in.
    pub async fn drain(mut self, cancel: Option<CancelSignal>) -> AggregateResult {
        let mut cancel = cancel;

        while !self.is_done() {
            if cancel.as_ref().is_some_and(CancelSignal::is_cancelled) {
                self.stop_cancelled();
                break;
            }

            tokio::select! {
                received = self.outputs.recv(), if self.outputs_state.is_open() => {
                    match received {
                        Some(output) => self.result.outputs.push(output),
                        None => self.outputs_state = QueueState::Closed,
                    }
                }
                received = self.failures.recv(), if self.failures_state.is_open() => {
                    match received {
                        Some(error) => self.result.merge_failure(error),
                        None => self.failures_state = QueueState::Closed,
                    }
                }
                _ = wait_cancelled(&mut cancel) => {
                    self.stop_cancelled();
                    break;
                }
            }
        }

        self.result
    }

    fn stop_cancelled(&mut self) {
        let received = self.result.observed();
        self.result.merge_failure(WorkError::DispatchCancelled {
            received,
            expected: self.expected,
        });
    }
}

async fn wait_cancelled(cancel: &mut Option<CancelSignal>) {
    match cancel {
        Some(signal) => signal.cancelled().await,
        None => std::future::pending().await,
    }
}
