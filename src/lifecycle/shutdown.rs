//! Shutdown coordination.

use crate::fanout::{cancel_pair, CancelHandle, CancelSignal};

/// Coordinator for graceful shutdown.
///
/// Every long-running task subscribes to the same signal; the HTTP server
/// also threads it into each request's context.
pub struct Shutdown {
    handle: CancelHandle,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (handle, _) = cancel_pair();
        Self { handle }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> CancelSignal {
        self.handle.signal()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.handle.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.handle.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_subscribers_observe_trigger() {
        let shutdown = Shutdown::new();
        let mut early = shutdown.subscribe();
        shutdown.trigger();
        let late = shutdown.subscribe();

        tokio::time::timeout(Duration::from_secs(1), early.cancelled())
            .await
            .expect("early subscriber notified");
        assert!(late.is_cancelled());
        assert!(shutdown.is_triggered());
    }
}
