//! crates/logging-sink/src/handle.rs
//!
//! Per-producer message assembly.

use std::fmt::{self, Display};

use logging::{LogError, LogResult, Priority, ReentrantGuard, ReentrantLock, Timestamp};
use parking_lot::Mutex;

use crate::sink::{Delivery, LogSink};

#[derive(Debug)]
struct Pending {
    text: String,
    priority: Priority,
    pinned: Option<Timestamp>,
    /// The assembling thread holds one level of the handle lock.
    assembling: bool,
}

impl Pending {
    const fn new(priority: Priority) -> Self {
        Self {
            text: String::new(),
            priority,
            pinned: None,
            assembling: false,
        }
    }

    fn reset(&mut self, priority: Priority) {
        self.text.clear();
        self.priority = priority;
        self.pinned = None;
    }
}

/// Accumulates one log message at a time for a [`LogSink`].
///
/// A handle may be shared between threads. The first [`append`](Self::append),
/// [`set_priority`](Self::set_priority) or [`pin_timestamp`](Self::pin_timestamp)
/// of a message takes the handle's reentrant lock and keeps it until
/// [`end`](Self::end) returns, so other threads sharing the handle block
/// until the message is terminated. A thread that starts a message must
/// therefore terminate it. [`hold`](Self::hold) additionally keeps the lock
/// across several messages.
///
/// # Examples
///
/// ```
/// use logging::{Priority, SinkConfig};
/// use logging_sink::{LogHandle, LogSink};
/// use test_support::SharedBuffer;
///
/// let output = SharedBuffer::new();
/// let sink = LogSink::with_config(output.clone(), SinkConfig::default().with_timestamps(false));
/// let handle = LogHandle::with_priority(&sink, Priority::Warn);
///
/// {
///     let _held = handle.hold();
///     handle.append("retrying in ").append(5).append("s");
///     handle.end().unwrap();
/// }
/// handle.log(Priority::Error, "gave up").unwrap();
///
/// assert_eq!(output.lines(), ["[WARN] retrying in 5s", "[ERROR] gave up"]);
/// ```
pub struct LogHandle<'a> {
    sink: &'a LogSink,
    lock: ReentrantLock,
    pending: Mutex<Pending>,
    default_priority: Priority,
}

impl<'a> LogHandle<'a> {
    /// Creates a handle whose messages default to [`Priority::Notice`].
    pub fn new(sink: &'a LogSink) -> Self {
        Self::with_priority(sink, Priority::Notice)
    }

    /// Creates a handle whose messages default to `priority`.
    pub fn with_priority(sink: &'a LogSink, priority: Priority) -> Self {
        Self {
            sink,
            lock: ReentrantLock::new(),
            pending: Mutex::new(Pending::new(priority)),
            default_priority: priority,
        }
    }

    /// The sink this handle writes to.
    pub fn sink(&self) -> &'a LogSink {
        self.sink
    }

    /// Appends the rendering of `fragment` to the in-progress message.
    ///
    /// The fragment is rendered before the message buffer is touched, so its
    /// `Display` implementation may itself append to this handle.
    pub fn append<T>(&self, fragment: T) -> &Self
    where
        T: Display,
    {
        self.begin();
        let rendered = fragment.to_string();
        self.pending.lock().text.push_str(&rendered);
        self
    }

    /// Holds the handle lock until the guard drops. Other threads sharing the
    /// handle block in `append` and `end` meanwhile.
    pub fn hold(&self) -> ReentrantGuard<'_> {
        self.lock.guard()
    }

    /// Overrides the in-progress message's priority until the next
    /// terminator.
    pub fn set_priority(&self, priority: Priority) -> &Self {
        self.begin();
        self.pending.lock().priority = priority;
        self
    }

    /// Priority the in-progress message will be emitted with.
    pub fn priority(&self) -> Priority {
        self.pending.lock().priority
    }

    /// Priority restored after each terminator.
    pub const fn default_priority(&self) -> Priority {
        self.default_priority
    }

    /// Captures the current time for the next line instead of the time the
    /// terminator runs. Consumed by that terminator.
    pub fn pin_timestamp(&self) -> &Self {
        self.begin();
        self.pending.lock().pinned = Some(Timestamp::now());
        self
    }

    /// The pinned timestamp waiting for the next terminator, if any.
    pub fn pinned(&self) -> Option<Timestamp> {
        self.pending.lock().pinned
    }

    /// Copy of the in-progress text.
    pub fn pending(&self) -> String {
        self.pending.lock().text.clone()
    }

    /// Terminates the in-progress message and releases the lock its
    /// assembly took.
    ///
    /// Returns `Ok(true)` when a line was written. When the sink is closed
    /// nothing is written and the message is kept for a later attempt; when
    /// the priority is gated out the message is discarded. In both cases the
    /// result is `Ok(false)`.
    ///
    /// # Errors
    ///
    /// [`LogError::Io`] when writing or flushing fails. The message is
    /// discarded.
    pub fn end(&self) -> LogResult<bool> {
        let _handle = self.lock.guard();
        let result = {
            let _sink = self.sink.lock();
            let mut pending = self.pending.lock();
            let delivery = self
                .sink
                .deliver(pending.priority, &pending.text, pending.pinned);
            match delivery {
                Ok(Delivery::Closed) => Ok(false),
                Ok(Delivery::Gated) => {
                    pending.reset(self.default_priority);
                    Ok(false)
                }
                Ok(Delivery::Written) => {
                    pending.reset(self.default_priority);
                    Ok(true)
                }
                Err(err) => {
                    pending.reset(self.default_priority);
                    Err(LogError::Io(err))
                }
            }
        };
        self.finish_assembly();
        result
    }

    /// Emits `text` at `priority` as one message.
    ///
    /// Anything already appended by the calling thread becomes the start of
    /// the line.
    ///
    /// # Errors
    ///
    /// As for [`end`](Self::end).
    pub fn log<T>(&self, priority: Priority, text: T) -> LogResult<bool>
    where
        T: Display,
    {
        self.set_priority(priority).append(text);
        self.end()
    }

    /// Takes the handle lock for the message being assembled. Only the first
    /// call of a message keeps its level; later calls release theirs again.
    fn begin(&self) {
        self.lock.lock();
        let mut pending = self.pending.lock();
        if pending.assembling {
            drop(pending);
            self.release_level();
        } else {
            pending.assembling = true;
        }
    }

    /// Drops the level [`begin`](Self::begin) kept. Must run while the
    /// calling thread owns the lock.
    fn finish_assembly(&self) {
        let assembling = std::mem::replace(&mut self.pending.lock().assembling, false);
        if assembling {
            self.release_level();
        }
    }

    fn release_level(&self) {
        let released = self.lock.unlock();
        debug_assert!(released.is_ok(), "handle lock released by a non-owner");
    }
}

impl fmt::Debug for LogHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self.pending.lock();
        f.debug_struct("LogHandle")
            .field("priority", &pending.priority)
            .field("default_priority", &self.default_priority)
            .field("pending", &pending.text)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
