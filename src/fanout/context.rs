//! Per-dispatch context: request id and parent span for telemetry, plus a
//! cooperative cancellation signal.

use tokio::sync::watch;

use crate::observability::SpanContext;

/// Create a connected cancellation handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal(Some(rx)))
}

/// Trigger side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Mark the signal cancelled. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// A new signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal(Some(self.tx.subscribe()))
    }
}

/// Observing side of a cancellation signal. The default signal never fires.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Option<watch::Receiver<bool>>);

impl CancelSignal {
    pub fn never() -> Self {
        Self(None)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once cancelled. Pending forever if the handle is dropped
    /// without cancelling, or for `never()`.
    pub async fn cancelled(&mut self) {
        if let Some(rx) = self.0.as_mut() {
            let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
            if fired {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

/// Context threaded from the request boundary into every worker.
#[derive(Debug, Clone, Default)]
pub struct Context {
    request_id: Option<String>,
    span: SpanContext,
    cancel: CancelSignal,
}

impl Context {
    /// Context with no request id and a signal that never fires.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_cancel(mut self, signal: CancelSignal) -> Self {
        self.cancel = signal;
        self
    }

    /// Spans started under this context become children of `span`.
    pub fn with_span(mut self, span: SpanContext) -> Self {
        self.span = span;
        self
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn span(&self) -> &SpanContext {
        &self.span
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_pair_fires() {
        let (handle, mut signal) = cancel_pair();
        assert!(!signal.is_cancelled());

        let waiter = tokio::spawn(async move {
            signal.cancelled().await;
        });
        handle.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("signal should fire")
            .unwrap();
        assert!(handle.is_cancelled());
        assert!(handle.signal().is_cancelled());
    }

    #[tokio::test]
    async fn test_never_signal_stays_pending() {
        let mut signal = CancelSignal::never();
        let res = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (handle, mut signal) = cancel_pair();
        drop(handle);
        let res = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(res.is_err());
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn test_context_builders() {
        let ctx = Context::background().with_request_id("req-1");
        assert_eq!(ctx.request_id(), Some("req-1"));
        assert!(!ctx.is_cancelled());
        assert!(matches!(ctx.span(), SpanContext::Detached));

        let ctx = ctx.with_span(SpanContext::Recorded(0));
        assert!(matches!(ctx.span(), SpanContext::Recorded(0)));
        assert_eq!(ctx.request_id(), Some("req-1"));
    }
}
