//! crates/logging-sink/src/tracing_layer.rs
//! Bridge from the `tracing` ecosystem into a [`LogSink`].
//!
//! [`SinkLayer`] is a `tracing-subscriber` layer that renders each event as
//! one line on a shared sink. Levels map onto priorities as follows:
//!
//! | tracing | priority |
//! |---------|----------|
//! | ERROR   | ERROR    |
//! | WARN    | WARN     |
//! | INFO    | NOTICE   |
//! | DEBUG   | DEBUG    |
//! | TRACE   | DEBUG1   |
//!
//! Events whose priority the sink would gate out are dropped before their
//! fields are visited.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use logging::Priority;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::sink::LogSink;

/// Forwards `tracing` events to a [`LogSink`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::{Priority, SinkConfig};
/// use logging_sink::{LogSink, SinkLayer};
/// use test_support::SharedBuffer;
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let output = SharedBuffer::new();
/// let sink = Arc::new(LogSink::with_config(output.clone(), SinkConfig::default().with_timestamps(false)));
/// let subscriber = tracing_subscriber::registry().with(SinkLayer::new(Arc::clone(&sink)));
///
/// tracing::subscriber::with_default(subscriber, || {
///     tracing::warn!(attempt = 2, "retrying");
///     tracing::debug!("not shown at NOTICE");
/// });
///
/// assert_eq!(output.lines(), ["[WARN] retrying attempt=2"]);
/// ```
#[derive(Clone, Debug)]
pub struct SinkLayer {
    sink: Arc<LogSink>,
}

impl SinkLayer {
    /// Creates a layer writing to `sink`.
    pub fn new(sink: Arc<LogSink>) -> Self {
        Self { sink }
    }

    /// The sink events are written to.
    pub fn sink(&self) -> &Arc<LogSink> {
        &self.sink
    }

    /// Priority an event at `level` is emitted with.
    pub const fn priority_for(level: &Level) -> Priority {
        match *level {
            Level::ERROR => Priority::Error,
            Level::WARN => Priority::Warn,
            Level::INFO => Priority::Notice,
            Level::DEBUG => Priority::Debug,
            Level::TRACE => Priority::Debug1,
        }
    }
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let priority = Self::priority_for(event.metadata().level());
        if !self.sink.enabled(priority) {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let _ = self.sink.emit(priority, &visitor.finish());
    }
}

/// Renders the `message` field first, then the remaining fields as
/// `name=value` pairs.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}
