//! Fan-out of one request into `count` concurrent workers.
//!
//! # Responsibilities
//! - Create both completion queues, sized to the worker count
//! - Spawn one worker per sequence index in `[0, count)`
//! - Spawn a supervisor that joins every worker, then closes both queues
//! - Hand the receivers to the aggregator and return its result

use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::config::DispatchConfig;
use crate::fanout::aggregator::ResultAggregator;
use crate::fanout::context::Context;
use crate::fanout::error::{CombinedError, WorkError};
use crate::fanout::outcome::{AggregateResult, WorkRequest};
use crate::fanout::worker::{Worker, TRACER_NAME};
use crate::observability::{metrics, tracer_for, KeyValue, Logger, Tracer, TracingLogger};

pub const DISPATCH_SPAN: &str = "dispatch";

pub struct Dispatcher {
    config: DispatchConfig,
    tracer: Arc<dyn Tracer>,
    logger: Arc<dyn Logger>,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig, tracer: Arc<dyn Tracer>, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            tracer,
            logger,
        }
    }

    /// Dispatcher logging through `tracing`. Spans are emitted only when
    /// `tracing_enabled` is set.
    pub fn with_tracing(config: DispatchConfig, tracing_enabled: bool) -> Self {
        Self::new(config, tracer_for(tracing_enabled), Arc::new(TracingLogger))
    }

    /// Run `count` workers over `input` and return the joined text plus the
    /// combined error, if any worker failed.
    pub async fn execute(
        &self,
        ctx: &Context,
        input: &str,
        count: usize,
    ) -> (String, Option<CombinedError>) {
        self.dispatch(ctx, input, count).await.into_parts()
    }

    /// Same as `execute`, returning the structured aggregate.
    pub async fn dispatch(&self, ctx: &Context, input: &str, count: usize) -> AggregateResult {
        let start = Instant::now();
        let span = self.tracer.start_span(
            TRACER_NAME,
            DISPATCH_SPAN,
            ctx.span(),
            &[KeyValue::int("count", count), KeyValue::string("input", input)],
        );
        let scope = span.context().tracing_span();
        let worker_ctx = ctx.clone().with_span(span.context());

        // A zero-capacity mpsc channel is not allowed.
        let capacity = count.max(1);
        let (outputs_tx, outputs_rx) = mpsc::channel(capacity);
        let (failures_tx, failures_rx) = mpsc::channel(capacity);

        let input: Arc<str> = Arc::from(input);
        let mut workers = JoinSet::new();
        for sequence in 0..count {
            let worker = Worker::new(
                WorkRequest {
                    sequence,
                    input: input.clone(),
                },
                self.config.clone(),
                self.tracer.clone(),
                self.logger.clone(),
            );
            workers.spawn(worker.run(
                worker_ctx.clone(),
                outputs_tx.clone(),
                failures_tx.clone(),
            ));
        }

        tokio::spawn(supervise(workers, outputs_tx, failures_tx).instrument(scope.clone()));

        let cancel = self
            .config
            .honor_cancellation
            .then(|| ctx.cancel_signal());
        let result = ResultAggregator::new(outputs_rx, failures_rx, count)
            .drain(cancel)
            .await;

        scope.in_scope(|| {
            self.logger.debug(
                "dispatch complete",
                &[
                    KeyValue::int("count", count),
                    KeyValue::int("outputs", result.outputs.len()),
                    KeyValue::int("failures", result.failure_count()),
                ],
            )
        });
        span.end(result.error().map(|e| e as &dyn Error));
        metrics::record_dispatch(start);

        result
    }
}

/// Join every worker, then drop the last senders so both queues close.
///
/// A worker that panics never reported, so its failure is reported here.
async fn supervise(
    mut workers: JoinSet<()>,
    outputs: mpsc::Sender<String>,
    failures: mpsc::Sender<WorkError>,
) {
    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            tracing::error!(error = %err, "Worker task failed");
            let _ = failures
                .send(WorkError::Aborted {
                    reason: err.to_string(),
                })
                .await;
        }
    }
    drop(outputs);
    drop(failures);
}
