//! In-memory telemetry collaborators for tests and embedding applications.

use std::error::Error;
use std::sync::{Arc, Mutex};

use tracing::Level;

use crate::observability::attribute::KeyValue;
use crate::observability::logging::Logger;
use crate::observability::tracing::{SpanContext, SpanHandle, Tracer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub message: String,
    pub attrs: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSpan {
    pub tracer: &'static str,
    pub name: &'static str,
    pub attrs: Vec<KeyValue>,
    /// Index of the parent span in start order.
    pub parent: Option<usize>,
    pub events: Vec<RecordedEvent>,
    pub ended: bool,
    /// Error text recorded at `end`, if any.
    pub error: Option<String>,
}

/// Tracer that keeps every span in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    spans: Arc<Mutex<Vec<RecordedSpan>>>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all spans started so far, in start order.
    pub fn spans(&self) -> Vec<RecordedSpan> {
        self.spans.lock().expect("recording tracer mutex poisoned").clone()
    }

    pub fn spans_named(&self, name: &str) -> Vec<RecordedSpan> {
        self.spans()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }
}

impl Tracer for RecordingTracer {
    fn start_span(
        &self,
        tracer_name: &'static str,
        span_name: &'static str,
        parent: &SpanContext,
        attrs: &[KeyValue],
    ) -> Box<dyn SpanHandle> {
        let parent = match parent {
            SpanContext::Recorded(index) => Some(*index),
            _ => None,
        };
        let mut spans = self.spans.lock().expect("recording tracer mutex poisoned");
        spans.push(RecordedSpan {
            tracer: tracer_name,
            name: span_name,
            attrs: attrs.to_vec(),
            parent,
            events: Vec::new(),
            ended: false,
            error: None,
        });
        Box::new(RecordingSpan {
            spans: self.spans.clone(),
            index: spans.len() - 1,
        })
    }
}

struct RecordingSpan {
    spans: Arc<Mutex<Vec<RecordedSpan>>>,
    index: usize,
}

impl SpanHandle for RecordingSpan {
    fn add_event(&self, message: &str, attrs: &[KeyValue]) {
        let mut spans = self.spans.lock().expect("recording tracer mutex poisoned");
        spans[self.index].events.push(RecordedEvent {
            message: message.to_string(),
            attrs: attrs.to_vec(),
        });
    }

    fn context(&self) -> SpanContext {
        SpanContext::Recorded(self.index)
    }

    fn end(self: Box<Self>, error: Option<&dyn Error>) {
        let mut spans = self.spans.lock().expect("recording tracer mutex poisoned");
        let span = &mut spans[self.index];
        span.ended = true;
        span.error = error.map(|e| e.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLog {
    pub level: Level,
    pub message: String,
    pub attrs: Vec<KeyValue>,
}

/// Logger that keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    records: Arc<Mutex<Vec<RecordedLog>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RecordedLog> {
        self.records.lock().expect("recording logger mutex poisoned").clone()
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.records().iter().filter(|r| r.level == level).count()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str, attrs: &[KeyValue]) {
        self.records
            .lock()
            .expect("recording logger mutex poisoned")
            .push(RecordedLog {
                level,
                message: message.to_string(),
                attrs: attrs.to_vec(),
            });
    }
}

/// `tracing` layer that records span parentage and event fields, for tests
/// that assert on what reaches a real subscriber.
#[cfg(test)]
pub(crate) mod capture {
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer};
    use tracing_subscriber::registry::LookupSpan;

    #[derive(Debug, Default)]
    struct FieldValues(Vec<(&'static str, String)>);

    impl Visit for FieldValues {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.push((field.name(), value.to_string()));
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name(), format!("{:?}", value)));
        }
    }

    fn lookup<'a>(fields: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[derive(Debug, Clone)]
    pub(crate) struct CapturedSpan {
        pub id: Id,
        pub parent: Option<Id>,
        fields: Vec<(&'static str, String)>,
    }

    impl CapturedSpan {
        pub fn field(&self, name: &str) -> Option<&str> {
            lookup(&self.fields, name)
        }
    }

    #[derive(Debug, Clone)]
    pub(crate) struct CapturedEvent {
        pub level: Level,
        /// Span the event was recorded in, explicit or contextual.
        pub span: Option<Id>,
        fields: Vec<(&'static str, String)>,
    }

    impl CapturedEvent {
        pub fn field(&self, name: &str) -> Option<&str> {
            lookup(&self.fields, name)
        }
    }

    #[derive(Debug, Clone, Default)]
    pub(crate) struct CaptureLayer {
        spans: Arc<Mutex<Vec<CapturedSpan>>>,
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl CaptureLayer {
        pub fn spans(&self) -> Vec<CapturedSpan> {
            self.spans.lock().unwrap().clone()
        }

        pub fn events(&self) -> Vec<CapturedEvent> {
            self.events.lock().unwrap().clone()
        }

        /// First span whose `otel.name` is `name`.
        pub fn span_named(&self, name: &str) -> Option<CapturedSpan> {
            self.spans()
                .into_iter()
                .find(|span| span.field("otel.name") == Some(name))
        }
    }

    impl<S> Layer<S> for CaptureLayer
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let mut fields = FieldValues::default();
            attrs.record(&mut fields);
            let parent = if attrs.is_contextual() {
                ctx.current_span().id().cloned()
            } else {
                attrs.parent().cloned()
            };
            self.spans.lock().unwrap().push(CapturedSpan {
                id: id.clone(),
                parent,
                fields: fields.0,
            });
        }

        fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
            let mut fields = FieldValues::default();
            event.record(&mut fields);
            self.events.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                span: ctx.event_span(event).map(|span| span.id()),
                fields: fields.0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_tracer_tracks_events_and_status() {
        let tracer = RecordingTracer::new();
        let parent = tracer.start_span("echo", "dispatch", &SpanContext::Detached, &[]);
        let span = tracer.start_span(
            "echo",
            "worker",
            &parent.context(),
            &[KeyValue::int("sequence", 2)],
        );
        span.add_event("do echo", &[]);
        span.end(None);

        let spans = tracer.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].parent, None);
        assert_eq!(spans[1].parent, Some(0));
        assert_eq!(spans[1].tracer, "echo");
        assert_eq!(spans[1].events.len(), 1);
        assert!(spans[1].ended);
        assert!(spans[1].error.is_none());
        assert!(!spans[0].ended);
    }

    #[test]
    fn test_recording_logger_counts_levels() {
        let logger = RecordingLogger::new();
        logger.info("a", &[]);
        logger.error("b", &[]);
        logger.error("c", &[]);

        assert_eq!(logger.count_at(Level::INFO), 1);
        assert_eq!(logger.count_at(Level::ERROR), 2);
    }
}
