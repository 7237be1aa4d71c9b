//! Requests, outcomes and the merged result of a dispatch.

use std::sync::Arc;

use crate::fanout::error::{CombinedError, WorkError};

const OUTPUT_SEPARATOR: &str = ", ";
const OUTPUT_TERMINATOR: &str = "...\n";

/// Input for one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRequest {
    pub sequence: usize,
    pub input: Arc<str>,
}

/// What a worker reports, exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    Success { output: String },
    Failure { error: WorkError },
}

impl WorkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkOutcome::Success { .. })
    }

    /// Metric label for this outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkOutcome::Success { .. } => "success",
            WorkOutcome::Failure { .. } => "failure",
        }
    }
}

/// Merged result of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    /// Successful outputs in arrival order.
    pub outputs: Vec<String>,
    pub error: Option<CombinedError>,
}

impl AggregateResult {
    pub(crate) fn merge_failure(&mut self, error: WorkError) {
        self.error = Some(CombinedError::fold(self.error.take(), error));
    }

    /// Outputs joined by `", "` and terminated by `"...\n"`.
    pub fn text(&self) -> String {
        format!("{}{}", self.outputs.join(OUTPUT_SEPARATOR), OUTPUT_TERMINATOR)
    }

    pub fn error(&self) -> Option<&CombinedError> {
        self.error.as_ref()
    }

    pub fn failure_count(&self) -> usize {
        self.error.as_ref().map_or(0, CombinedError::len)
    }

    /// Total outcomes observed.
    pub fn observed(&self) -> usize {
        self.outputs.len() + self.failure_count()
    }

    pub fn into_parts(self) -> (String, Option<CombinedError>) {
        (self.text(), self.error)
    }
}
