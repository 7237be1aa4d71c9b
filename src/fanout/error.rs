//! Worker failures and their aggregate.

use std::fmt;

use thiserror::Error;

/// Failure reported by a single unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    #[error("do echo: timeout (sequence {sequence}, input {input:?})")]
    Timeout { sequence: usize, input: String },

    #[error("do echo: cancelled (sequence {sequence})")]
    Cancelled { sequence: usize },

    /// The worker task panicked or was aborted before reporting.
    #[error("worker task aborted: {reason}")]
    Aborted { reason: String },

    #[error("dispatch cancelled after {received} of {expected} outcomes")]
    DispatchCancelled { received: usize, expected: usize },
}

impl WorkError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WorkError::Timeout { .. })
    }

    /// Sequence index of the worker that failed, when known.
    pub fn sequence(&self) -> Option<usize> {
        match self {
            WorkError::Timeout { sequence, .. } | WorkError::Cancelled { sequence } => {
                Some(*sequence)
            }
            WorkError::Aborted { .. } | WorkError::DispatchCancelled { .. } => None,
        }
    }
}

/// Ordered aggregation of worker failures, in arrival order.
///
/// Display renders every constituent message, one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedError {
    errors: Vec<WorkError>,
}

impl CombinedError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one more failure into the aggregate.
    pub fn merge(&mut self, error: WorkError) {
        self.errors.push(error);
    }

    /// Fold `error` into an optional aggregate, creating it on first failure.
    pub fn fold(acc: Option<CombinedError>, error: WorkError) -> CombinedError {
        let mut combined = acc.unwrap_or_default();
        combined.merge(error);
        combined
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[WorkError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkError> {
        self.errors.iter()
    }
}

impl From<WorkError> for CombinedError {
    fn from(error: WorkError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<WorkError> for CombinedError {
    fn from_iter<I: IntoIterator<Item = WorkError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for CombinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for CombinedError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout(sequence: usize) -> WorkError {
        WorkError::Timeout {
            sequence,
            input: "hello".into(),
        }
    }

    #[test]
    fn test_merge_preserves_every_message() {
        let mut combined = CombinedError::new();
        for seq in [13, 11, 12] {
            combined.merge(timeout(seq));
        }

        let text = combined.to_string();
        assert_eq!(combined.len(), 3);
        for seq in [11, 12, 13] {
            assert!(text.contains(&format!("sequence {}", seq)), "missing {} in {}", seq, text);
        }
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_merge_keeps_arrival_order() {
        let combined: CombinedError = [timeout(12), timeout(11)].into_iter().collect();
        let order: Vec<_> = combined.iter().filter_map(WorkError::sequence).collect();
        assert_eq!(order, vec![12, 11]);
    }

    #[test]
    fn test_fold_creates_on_first_failure() {
        let first = CombinedError::fold(None, timeout(11));
        assert_eq!(first.len(), 1);
        let second = CombinedError::fold(Some(first), timeout(12));
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_empty_displays_nothing() {
        assert_eq!(CombinedError::new().to_string(), "");
    }

    #[test]
    fn test_timeout_message() {
        let err = timeout(11);
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "do echo: timeout (sequence 11, input \"hello\")");
    }
}
