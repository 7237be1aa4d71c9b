//! Span-emitting tracer collaborator.
//!
//! # Responsibilities
//! - Define the `Tracer` / `SpanHandle` seam consumed by the fanout core
//! - Map spans onto the `tracing` crate for the running service
//! - Record success/failure status when a span ends
//!
//! # Design Decisions
//! - Span status follows OpenTelemetry naming (`otel.status_code`) so an
//!   OTLP bridge can be layered on the subscriber without touching the core
//! - Tracer failures are swallowed; nothing here returns `Result`

use std::error::Error;
use std::sync::Arc;

use tracing::{field, Level, Span};

use crate::observability::attribute::{Fields, KeyValue};

/// Parent reference handed from an open span to the spans started under it.
#[derive(Debug, Clone, Default)]
pub enum SpanContext {
    /// No explicit parent. `tracing` spans attach to the current span.
    #[default]
    Detached,
    Tracing(Span),
    /// Start-order index of a span held by a `RecordingTracer`.
    Recorded(usize),
}

impl SpanContext {
    /// The `tracing` span to enter while work runs under this context.
    pub fn tracing_span(&self) -> Span {
        match self {
            SpanContext::Tracing(span) => span.clone(),
            _ => Span::none(),
        }
    }
}

/// Handle to an open span.
pub trait SpanHandle: Send {
    /// Attach a point-in-time event to the span.
    fn add_event(&self, message: &str, attrs: &[KeyValue]);

    /// Reference used to parent spans started under this one.
    fn context(&self) -> SpanContext;

    /// Close the span, recording an error status when `error` is set.
    fn end(self: Box<Self>, error: Option<&dyn Error>);
}

/// Source of spans.
pub trait Tracer: Send + Sync {
    fn start_span(
        &self,
        tracer_name: &'static str,
        span_name: &'static str,
        parent: &SpanContext,
        attrs: &[KeyValue],
    ) -> Box<dyn SpanHandle>;
}

/// Tracer for the service: `tracing` spans when enabled, otherwise nothing.
pub fn tracer_for(enabled: bool) -> Arc<dyn Tracer> {
    if enabled {
        Arc::new(TracingTracer)
    } else {
        Arc::new(NoopTracer)
    }
}

/// Tracer backed by `tracing` spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start_span(
        &self,
        tracer_name: &'static str,
        span_name: &'static str,
        parent: &SpanContext,
        attrs: &[KeyValue],
    ) -> Box<dyn SpanHandle> {
        let parent = match parent {
            SpanContext::Tracing(span) => span.id(),
            _ => Span::current().id(),
        };
        let fields = Fields::from_attrs(attrs);
        let span = tracing::info_span!(
            parent: parent,
            "span",
            otel.name = span_name,
            tracer = tracer_name,
            sequence = fields.sequence,
            input = fields.input,
            request_id = fields.request_id,
            count = fields.count,
            attributes = fields.other.as_deref(),
            otel.status_code = field::Empty,
            error = field::Empty,
        );
        Box::new(TracingSpan { span })
    }
}

struct TracingSpan {
    span: Span,
}

impl SpanHandle for TracingSpan {
    fn add_event(&self, message: &str, attrs: &[KeyValue]) {
        keyed_event!(parent: &self.span, Level::INFO, Fields::from_attrs(attrs), message);
    }

    fn context(&self) -> SpanContext {
        SpanContext::Tracing(self.span.clone())
    }

    fn end(self: Box<Self>, error: Option<&dyn Error>) {
        match error {
            Some(err) => {
                self.span.record("otel.status_code", "ERROR");
                self.span.record("error", field::display(err));
            }
            None => {
                self.span.record("otel.status_code", "OK");
            }
        }
        // Span closes when the last handle is dropped.
    }
}

/// Tracer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(
        &self,
        _: &'static str,
        _: &'static str,
        _: &SpanContext,
        _: &[KeyValue],
    ) -> Box<dyn SpanHandle> {
        Box::new(NoopSpan)
    }
}

struct NoopSpan;

impl SpanHandle for NoopSpan {
    fn add_event(&self, _: &str, _: &[KeyValue]) {}

    fn context(&self) -> SpanContext {
        SpanContext::Detached
    }

    fn end(self: Box<Self>, _: Option<&dyn Error>) {}
}
