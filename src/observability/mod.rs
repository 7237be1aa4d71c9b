//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! fanout core (dispatcher, workers):
//!     → tracing.rs (Tracer / SpanHandle collaborators)
//!     → logging.rs (Logger collaborator)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → tracing-subscriber (pretty or JSON to stdout)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - The core never touches global telemetry directly; it receives a
//!   `Tracer` and a `Logger` as trait objects
//! - Telemetry failures never feed back into control flow
//! - Recording implementations exist so tests can assert on emitted telemetry

/// Emit a `tracing` event carrying an [`attribute::Fields`] view as keyed
/// fields. Absent keys are left out of the record.
macro_rules! keyed_event {
    (parent: $parent:expr, $level:expr, $fields:expr, $message:expr) => {{
        let fields = &$fields;
        ::tracing::event!(
            parent: $parent,
            $level,
            sequence = fields.sequence,
            input = fields.input,
            request_id = fields.request_id,
            error = fields.error,
            count = fields.count,
            outputs = fields.outputs,
            failures = fields.failures,
            attributes = fields.other.as_deref(),
            "{}",
            $message
        )
    }};
    ($level:expr, $fields:expr, $message:expr) => {{
        let fields = &$fields;
        ::tracing::event!(
            $level,
            sequence = fields.sequence,
            input = fields.input,
            request_id = fields.request_id,
            error = fields.error,
            count = fields.count,
            outputs = fields.outputs,
            failures = fields.failures,
            attributes = fields.other.as_deref(),
            "{}",
            $message
        )
    }};
}

pub mod attribute;
pub mod logging;
pub mod metrics;
pub mod recording;
pub mod tracing;

pub use attribute::{AttrValue, Fields, KeyValue};
pub use logging::{Logger, TracingLogger};
pub use recording::{RecordedLog, RecordedSpan, RecordingLogger, RecordingTracer};
pub use self::tracing::{tracer_for, NoopTracer, SpanContext, SpanHandle, Tracer, TracingTracer};
