#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `fdlog` bundles two layers used by long-running services:
//!
//! - [`io`]: `std::io` streams over raw file descriptors. Reads go through a
//!   refill-on-demand window that keeps the last few consumed bytes for
//!   `unget`; writes reach the descriptor before the call returns. Counted
//!   variants report every transferred byte to a caller-supplied counter.
//! - [`log`]: priority-gated, timestamped log lines that several threads can
//!   assemble concurrently without ever interleaving.
//!
//! # Examples
//!
//! Log through a pipe and count the bytes that crossed it:
//!
//! ```
//! use std::io::Read;
//! use fdlog::io::{ByteCount, CountedInputStream, CountedOutputStream};
//! use fdlog::log::{LogHandle, LogSink, Priority, SinkConfig};
//!
//! let (rd, wr) = fdlog::platform::pipe()?;
//! let sent = ByteCount::new();
//! let sink = LogSink::with_config(
//!     CountedOutputStream::with_counter_fd(sent.clone(), wr),
//!     SinkConfig::default().with_timestamps(false),
//! );
//! LogHandle::new(&sink).log(Priority::Warn, "queue nearly full")?;
//! sink.close();
//! fdlog::platform::close(wr)?;
//!
//! let mut text = String::new();
//! let mut input = CountedInputStream::with_counter_fd(ByteCount::new(), rd);
//! input.read_to_string(&mut text)?;
//! input.close()?;
//!
//! assert_eq!(text, "[WARN] queue nearly full\n");
//! assert_eq!(sent.get(), text.len() as u64);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use platform;

/// Descriptor-backed buffers and streams.
pub mod io {
    pub use fd_io::*;
}

/// Priorities, sinks and message handles.
pub mod log {
    pub use logging::{
        LockError, LogError, LogResult, Priority, ReentrantGuard, ReentrantLock, SinkConfig,
        Timestamp,
    };
    pub use logging_sink::{FileLogSink, LogHandle, LogSink, OpenMode};
    #[cfg(feature = "tracing")]
    pub use logging_sink::SinkLayer;
}
