//! crates/logging-sink/src/sink.rs
//!
//! The shared, gated output side of the logging facility.

use std::fmt::{self, Write as _};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use logging::{LogError, LogResult, Priority, ReentrantGuard, ReentrantLock, SinkConfig, Timestamp};
use parking_lot::Mutex;
use tracing::warn;

type Stream = Box<dyn Write + Send>;

/// What happened to a record handed to the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// No stream was bound; nothing was formatted.
    Closed,
    /// The priority did not pass the threshold.
    Gated,
    /// The line was written and flushed.
    Written,
}

/// Priority-gated line writer shared by any number of [`LogHandle`]s.
///
/// A sink without a bound stream is *closed*: direct emission fails with
/// [`LogError::Closed`] and handle terminators become no-ops.
///
/// [`LogHandle`]: crate::LogHandle
pub struct LogSink {
    stream: Mutex<Option<Stream>>,
    threshold: AtomicU8,
    timestamps: AtomicBool,
    priority_tags: AtomicBool,
    lock: ReentrantLock,
}

impl LogSink {
    /// Creates an open sink with the default configuration.
    pub fn new<W>(stream: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::with_config(stream, SinkConfig::default())
    }

    /// Creates an open sink with `config`.
    pub fn with_config<W>(stream: W, config: SinkConfig) -> Self
    where
        W: Write + Send + 'static,
    {
        let sink = Self::unbound(config);
        *sink.stream.lock() = Some(Box::new(stream));
        sink
    }

    /// Creates a closed sink; [`bind`](Self::bind) opens it later.
    pub fn unbound(config: SinkConfig) -> Self {
        Self {
            stream: Mutex::new(None),
            threshold: AtomicU8::new(config.threshold.ordinal()),
            timestamps: AtomicBool::new(config.timestamps),
            priority_tags: AtomicBool::new(config.priority_tags),
            lock: ReentrantLock::new(),
        }
    }

    /// Creates a sink writing to the process's standard error.
    pub fn stderr(config: SinkConfig) -> Self {
        Self::with_config(io::stderr(), config)
    }

    /// Whether a stream is bound.
    pub fn is_open(&self) -> bool {
        self.stream.lock().is_some()
    }

    /// Flushes and drops the bound stream. Closing a closed sink does
    /// nothing.
    ///
    /// A failing final flush is reported through `tracing` and does not keep
    /// the stream bound.
    pub fn close(&self) {
        let _guard = self.lock.guard();
        if let Some(stream) = self.stream.lock().take() {
            flush_released(stream, "close");
        }
    }

    /// Binds `stream`, replacing (and flushing) any previous one.
    pub fn bind<W>(&self, stream: W)
    where
        W: Write + Send + 'static,
    {
        let _guard = self.lock.guard();
        let previous = self.stream.lock().replace(Box::new(stream));
        if let Some(previous) = previous {
            flush_released(previous, "rebind");
        }
    }

    /// Replaces the threshold.
    pub fn set_log_level(&self, threshold: Priority) {
        self.threshold.store(threshold.ordinal(), Ordering::Release);
    }

    /// Least severe priority currently emitted.
    pub fn log_level(&self) -> Priority {
        Priority::from_ordinal(self.threshold.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Enables or disables the timestamp segment.
    pub fn set_timestamps(&self, enabled: bool) {
        self.timestamps.store(enabled, Ordering::Release);
    }

    /// Enables or disables the priority segment.
    pub fn set_priority_tags(&self, enabled: bool) {
        self.priority_tags.store(enabled, Ordering::Release);
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> SinkConfig {
        SinkConfig {
            threshold: self.log_level(),
            timestamps: self.timestamps.load(Ordering::Acquire),
            priority_tags: self.priority_tags.load(Ordering::Acquire),
        }
    }

    /// Applies every field of `config`.
    pub fn apply(&self, config: SinkConfig) {
        self.set_log_level(config.threshold);
        self.set_timestamps(config.timestamps);
        self.set_priority_tags(config.priority_tags);
    }

    /// Whether a message of `priority` would be emitted.
    pub fn enabled(&self, priority: Priority) -> bool {
        priority.passes(self.log_level())
    }

    /// Writes `text` as one complete line.
    ///
    /// Returns `Ok(false)` when the priority is gated out.
    ///
    /// # Errors
    ///
    /// [`LogError::Closed`] when no stream is bound, [`LogError::Io`] when the
    /// write or flush fails.
    pub fn emit(&self, priority: Priority, text: &str) -> LogResult<bool> {
        match self.deliver(priority, text, None)? {
            Delivery::Closed => Err(LogError::Closed),
            Delivery::Gated => Ok(false),
            Delivery::Written => Ok(true),
        }
    }

    /// Holds the sink lock so several lines can be written back to back by
    /// the calling thread.
    ///
    /// Handle terminators take their handle's lock before the sink lock.
    /// While holding this guard, do not touch a [`LogHandle`] that another
    /// thread may be using: that thread can own the handle lock and be
    /// waiting for this one, and the two would deadlock. Handles used only by
    /// the guard's thread are safe.
    ///
    /// [`LogHandle`]: crate::LogHandle
    pub fn lock(&self) -> ReentrantGuard<'_> {
        self.lock.guard()
    }

    /// Formats and writes one record under the sink lock.
    pub(crate) fn deliver(
        &self,
        priority: Priority,
        text: &str,
        pinned: Option<Timestamp>,
    ) -> io::Result<Delivery> {
        let _guard = self.lock.guard();
        let mut stream = self.stream.lock();
        let Some(stream) = stream.as_mut() else {
            return Ok(Delivery::Closed);
        };
        if !self.enabled(priority) {
            return Ok(Delivery::Gated);
        }

        let line = self.format_line(priority, text, pinned);
        stream.write_all(line.as_bytes())?;
        stream.flush()?;
        Ok(Delivery::Written)
    }

    fn format_line(&self, priority: Priority, text: &str, pinned: Option<Timestamp>) -> String {
        let mut line = String::with_capacity(text.len() + 52);
        if self.timestamps.load(Ordering::Acquire) {
            let stamp = pinned.unwrap_or_else(Timestamp::now);
            let _ = write!(line, "[{stamp}] ");
        }
        if self.priority_tags.load(Ordering::Acquire) {
            let _ = write!(line, "[{priority}] ");
        }
        line.push_str(text);
        line.push('\n');
        line
    }
}

/// Flushes a stream the sink no longer owns.
fn flush_released(mut stream: Stream, during: &'static str) {
    if let Err(error) = stream.flush() {
        warn!(%error, during, "final flush of log stream failed");
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("open", &self.is_open())
            .field("config", &self.config())
            .finish_non_exhaustive()
    }
}
