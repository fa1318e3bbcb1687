#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging-sink/src/lib.rs
//!
//! # Overview
//!
//! `logging-sink` turns fragments appended by producer threads into complete,
//! timestamped, priority-gated lines on a shared output stream.
//!
//! # Design
//!
//! - [`LogSink`] owns the output stream, the threshold and the line-format
//!   switches. Every line is formatted, written, and flushed while the sink's
//!   [`ReentrantLock`](logging::ReentrantLock) is held, so lines from
//!   different producers never interleave.
//! - [`LogHandle`] accumulates one in-progress message. Appending takes the
//!   handle's own reentrant lock, so a thread may append repeatedly, including
//!   from nested helpers, while other threads sharing the handle wait.
//!   The terminator [`LogHandle::end`] takes the handle lock before the sink
//!   lock; that order is fixed across the crate.
//! - [`FileLogSink`] binds a [`LogSink`] to a file and degrades to standard
//!   error when the file cannot be opened.
//!
//! # Invariants
//!
//! - A line is `[YYYY/MM/DD HH:MM:SS:mmm] [PRIORITY] text\n`, each bracketed
//!   segment present only when enabled.
//! - A message of priority `P` reaches the stream iff
//!   `P.ordinal() <= threshold.ordinal()`.
//! - Terminating against a closed sink leaves the handle's message intact.
//!
//! # Examples
//!
//! ```
//! use logging::{Priority, SinkConfig};
//! use logging_sink::{LogHandle, LogSink};
//! use test_support::SharedBuffer;
//!
//! let output = SharedBuffer::new();
//! let sink = LogSink::with_config(output.clone(), SinkConfig::plain(Priority::Notice));
//! let handle = LogHandle::new(&sink);
//!
//! handle.append("copied ").append(3).append(" files");
//! assert!(handle.end().unwrap());
//!
//! handle.set_priority(Priority::Debug);
//! handle.append("hidden");
//! assert!(!handle.end().unwrap());
//!
//! assert_eq!(output.text(), "copied 3 files\n");
//! ```

mod file_sink;
mod handle;
mod sink;
#[cfg(feature = "tracing")]
mod tracing_layer;

pub use file_sink::{FileLogSink, OpenMode};
pub use handle::LogHandle;
pub use logging::{LogError, LogResult, Priority, SinkConfig};
pub use sink::LogSink;
#[cfg(feature = "tracing")]
pub use tracing_layer::SinkLayer;
