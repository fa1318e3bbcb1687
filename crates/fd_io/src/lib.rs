#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/fd_io/src/lib.rs
//!
//! # Overview
//!
//! `fd_io` lets standard [`std::io`] consumers read and write directly
//! against raw OS file descriptors. Callers attach an already-open descriptor
//! to a stream façade and then use the familiar [`Read`](std::io::Read),
//! [`BufRead`](std::io::BufRead) and [`Write`](std::io::Write) traits.
//!
//! # Design
//!
//! The crate is layered bottom-up:
//!
//! - [`DescriptorState`] owns one descriptor slot and its
//!   attach/detach/close lifecycle.
//! - [`ReadBuffer`] refills a fixed [`ReadWindow`] with one `read(2)` per
//!   refill, keeping up to [`PUTBACK_CAPACITY`] consumed bytes available for
//!   [`unget`](ReadWindow::unget).
//! - [`WriteBuffer`] writes through immediately; nothing is held back.
//! - [`DuplexBuffer`] implements both the [`Refill`] and [`WriteThrough`]
//!   capabilities over a single shared [`DescriptorState`].
//! - Every buffer is generic over a [`CountSink`]. The default [`NoCount`]
//!   compiles away; [`ByteCount`] (or any other sink) turns the buffer into
//!   its byte-counting variant without changing the buffering policy.
//! - [`InputStream`], [`OutputStream`] and [`DuplexStream`] wrap exactly one
//!   buffer each and track end-of-file and failure state.
//!
//! # Invariants
//!
//! - A refill issues at most one system call.
//! - After any successful refill, up to [`PUTBACK_CAPACITY`] of the most
//!   recently consumed bytes can be pushed back.
//! - Counters only ever grow, and only by bytes the kernel confirmed.
//! - Dropping a buffer never closes its descriptor; [`close`](InputStream::close)
//!   does.
//!
//! # Errors
//!
//! Buffer operations return [`FdError`]. Stream façades convert it into
//! [`std::io::Error`], preserving the OS error code.
//!
//! # Examples
//!
//! ```
//! use std::io::{Read, Write};
//! use fd_io::{ByteCount, CountedInputStream, CountedOutputStream};
//!
//! let (rd, wr) = platform::pipe()?;
//! let sent = ByteCount::new();
//! let received = ByteCount::new();
//!
//! let mut output = CountedOutputStream::with_counter_fd(sent.clone(), wr);
//! output.write_all(b"hello")?;
//! output.close()?;
//!
//! let mut input = CountedInputStream::with_counter_fd(received.clone(), rd);
//! let mut text = String::new();
//! input.read_to_string(&mut text)?;
//! input.close()?;
//!
//! assert_eq!(text, "hello");
//! assert_eq!(sent.get(), 5);
//! assert_eq!(received.get(), 5);
//! # Ok::<(), std::io::Error>(())
//! ```

mod counter;
mod descriptor;
mod duplex;
mod error;
mod read_buffer;
mod stream;
mod write_buffer;

pub use counter::{ByteCount, CountSink, FnCount, NoCount};
pub use descriptor::{DETACHED, DescriptorState};
pub use duplex::{CountedDuplexBuffer, DuplexBuffer};
pub use error::{FdError, FdResult};
pub use read_buffer::{
    CountedReadBuffer, Fill, MAIN_CAPACITY, PUTBACK_CAPACITY, ReadBuffer, ReadWindow, Refill,
};
pub use stream::{
    CountedDuplexStream, CountedInputStream, CountedOutputStream, DuplexStream, InputStream,
    OutputStream, StreamFlags,
};
pub use write_buffer::{CountedWriteBuffer, WriteBuffer, WriteThrough};
