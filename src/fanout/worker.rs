//! A single unit of work.
//!
//! # Responsibilities
//! - Sleep `(sequence + 1)` work units (synthetic load)
//! - Classify the outcome against the failure threshold
//! - Emit one span, one span event and one log record per outcome
//! - Report exactly one outcome on exactly one queue

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::config::DispatchConfig;
use crate::fanout::context::Context;
use crate::fanout::error::WorkError;
use crate::fanout::outcome::{WorkOutcome, WorkRequest};
use crate::observability::{metrics, KeyValue, Logger, Tracer};

pub const TRACER_NAME: &str = "echo";
pub const WORKER_SPAN: &str = "worker";
const EVENT_MESSAGE: &str = "do echo";

/// Pure classification rule: indices past the threshold fail.
pub fn classify(request: &WorkRequest, failure_threshold: usize) -> WorkOutcome {
    if request.sequence > failure_threshold {
        WorkOutcome::Failure {
            error: WorkError::Timeout {
                sequence: request.sequence,
                input: request.input.to_string(),
            },
        }
    } else {
        WorkOutcome::Success {
            output: request.input.to_string(),
        }
    }
}

pub struct Worker {
    request: WorkRequest,
    config: DispatchConfig,
    tracer: Arc<dyn Tracer>,
    logger: Arc<dyn Logger>,
}

impl Worker {
    pub fn new(
        request: WorkRequest,
        config: DispatchConfig,
        tracer: Arc<dyn Tracer>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            request,
            config,
            tracer,
            logger,
        }
    }

    /// Run to completion and report onto `outputs` or `failures`.
    pub async fn run(
        self,
        ctx: Context,
        outputs: mpsc::Sender<String>,
        failures: mpsc::Sender<WorkError>,
    ) {
        let sequence = self.request.sequence;
        let span = self.tracer.start_span(
            TRACER_NAME,
            WORKER_SPAN,
            ctx.span(),
            &[KeyValue::int("sequence", sequence)],
        );
        // Log records and the synthetic work run inside the worker span.
        let scope = span.context().tracing_span();

        let outcome = self.work(&ctx).instrument(scope.clone()).await;

        let mut attrs = vec![
            KeyValue::int("sequence", sequence),
            KeyValue::string("input", &*self.request.input),
        ];
        if let Some(request_id) = ctx.request_id() {
            attrs.push(KeyValue::string("request_id", request_id));
        }

        scope.in_scope(|| match &outcome {
            WorkOutcome::Success { .. } => {
                self.logger.info(EVENT_MESSAGE, &attrs);
                span.add_event(EVENT_MESSAGE, &attrs);
            }
            WorkOutcome::Failure { error } => {
                attrs.push(KeyValue::string("error", error.to_string()));
                self.logger.error(EVENT_MESSAGE, &attrs);
                span.add_event(EVENT_MESSAGE, &attrs);
            }
        });
        span.end(match &outcome {
            WorkOutcome::Success { .. } => None,
            WorkOutcome::Failure { error } => Some(error as &dyn Error),
        });
        metrics::record_outcome(outcome.kind());

        let delivered = match outcome {
            WorkOutcome::Success { output } => outputs.send(output).await.is_ok(),
            WorkOutcome::Failure { error } => failures.send(error).await.is_ok(),
        };
        if !delivered {
            scope.in_scope(|| {
                self.logger.debug(
                    "outcome dropped, aggregator gone",
                    &[KeyValue::int("sequence", sequence)],
                )
            });
        }
    }

    async fn work(&self, ctx: &Context) -> WorkOutcome {
        let units = u32::try_from(self.request.sequence + 1).unwrap_or(u32::MAX);
        let delay = self.config.work_unit().saturating_mul(units);

        if self.config.honor_cancellation {
            let mut cancel = ctx.cancel_signal();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    return WorkOutcome::Failure {
                        error: WorkError::Cancelled { sequence: self.request.sequence },
                    };
                }
            }
        } else {
            tokio::time::sleep(delay).await;
        }

        classify(&self.request, self.config.failure_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::context::cancel_pair;
    use crate::observability::recording::capture::CaptureLayer;
    use crate::observability::{
        attribute, AttrValue, RecordingLogger, RecordingTracer, SpanContext, TracingLogger,
        TracingTracer,
    };
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    fn request(sequence: usize) -> WorkRequest {
        WorkRequest {
            sequence,
            input: Arc::from("hello"),
        }
    }

    #[test]
    fn test_classification_threshold() {
        for sequence in 0..=20 {
            let outcome = classify(&request(sequence), 10);
            assert_eq!(outcome.is_success(), sequence <= 10, "sequence {}", sequence);
        }
    }

    #[test]
    fn test_success_echoes_input() {
        assert_eq!(
            classify(&request(0), 10),
            WorkOutcome::Success { output: "hello".into() }
        );
    }

    #[tokio::test]
    async fn test_worker_reports_failure_once() {
        let tracer = RecordingTracer::new();
        let logger = RecordingLogger::new();
        let (out_tx, mut out_rx) = mpsc::channel(1);
        let (err_tx, mut err_rx) = mpsc::channel(1);

        let worker = Worker::new(
            request(11),
            DispatchConfig::default(),
            Arc::new(tracer.clone()),
            Arc::new(logger.clone()),
        );
        worker
            .run(Context::background().with_request_id("req-7"), out_tx, err_tx)
            .await;

        assert!(out_rx.recv().await.is_none());
        let err = err_rx.recv().await.expect("failure reported");
        assert_eq!(err.sequence(), Some(11));
        assert!(err_rx.recv().await.is_none());

        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::ERROR);
        assert!(attribute::find(&records[0].attrs, "error").is_some());
        assert_eq!(
            attribute::find(&records[0].attrs, "request_id"),
            Some(&AttrValue::Str("req-7".into()))
        );

        let spans = tracer.spans_named(WORKER_SPAN);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].ended);
        assert!(spans[0].error.is_some());
        assert_eq!(spans[0].events.len(), 1);
    }

    #[tokio::test]
    async fn test_worker_ignores_cancellation_by_default() {
        let (handle, signal) = cancel_pair();
        handle.cancel();
        let (out_tx, mut out_rx) = mpsc::channel(1);
        let (err_tx, _err_rx) = mpsc::channel(1);

        let worker = Worker::new(
            request(2),
            DispatchConfig::default(),
            Arc::new(RecordingTracer::new()),
            Arc::new(RecordingLogger::new()),
        );
        worker
            .run(Context::background().with_cancel(signal), out_tx, err_tx)
            .await;

        assert_eq!(out_rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_worker_honors_cancellation_when_enabled() {
        let (handle, signal) = cancel_pair();
        handle.cancel();
        let (out_tx, _out_rx) = mpsc::channel(1);
        let (err_tx, mut err_rx) = mpsc::channel(1);

        let config = DispatchConfig {
            work_unit_ms: 60_000,
            honor_cancellation: true,
            ..DispatchConfig::default()
        };
        let worker = Worker::new(
            request(3),
            config,
            Arc::new(RecordingTracer::new()),
            Arc::new(RecordingLogger::new()),
        );
        worker
            .run(Context::background().with_cancel(signal), out_tx, err_tx)
            .await;

        assert_eq!(err_rx.recv().await, Some(WorkError::Cancelled { sequence: 3 }));
    }

    #[tokio::test]
    async fn test_worker_span_nests_under_context_span() {
        let tracer = RecordingTracer::new();
        let parent = tracer.start_span(TRACER_NAME, "dispatch", &SpanContext::Detached, &[]);
        let (out_tx, _out_rx) = mpsc::channel(1);
        let (err_tx, _err_rx) = mpsc::channel(1);

        Worker::new(
            request(0),
            DispatchConfig::default(),
            Arc::new(tracer.clone()),
            Arc::new(RecordingLogger::new()),
        )
        .run(Context::background().with_span(parent.context()), out_tx, err_tx)
        .await;

        let workers = tracer.spans_named(WORKER_SPAN);
        assert_eq!(workers.len(), 1);
        assert_eq!(workers[0].parent, Some(0));
    }

    #[tokio::test]
    async fn test_worker_logs_inside_its_tracing_span() {
        let capture = CaptureLayer::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

        let tracer: Arc<dyn Tracer> = Arc::new(TracingTracer);
        let parent = tracer.start_span(TRACER_NAME, "dispatch", &SpanContext::Detached, &[]);
        let (out_tx, mut out_rx) = mpsc::channel(1);
        let (err_tx, _err_rx) = mpsc::channel(1);

        Worker::new(
            request(2),
            DispatchConfig::default(),
            tracer.clone(),
            Arc::new(TracingLogger),
        )
        .run(
            Context::background()
                .with_request_id("req-9")
                .with_span(parent.context()),
            out_tx,
            err_tx,
        )
        .await;
        assert_eq!(out_rx.recv().await.as_deref(), Some("hello"));

        let dispatch = capture.span_named("dispatch").expect("dispatch span");
        let worker = capture.span_named(WORKER_SPAN).expect("worker span");
        assert_eq!(worker.parent.as_ref(), Some(&dispatch.id));

        let echoes: Vec<_> = capture
            .events()
            .into_iter()
            .filter(|event| event.field("message") == Some(EVENT_MESSAGE))
            .collect();
        // One log record plus one span event.
        assert_eq!(echoes.len(), 2);
        for event in &echoes {
            assert_eq!(event.span.as_ref(), Some(&worker.id));
            assert_eq!(event.field("sequence"), Some("2"));
            assert_eq!(event.field("input"), Some("hello"));
            assert_eq!(event.field("request_id"), Some("req-9"));
        }
        parent.end(None);
    }
}
