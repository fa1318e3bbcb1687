//! crates/fd_io/src/stream/duplex.rs
//! Bidirectional stream façade.

use std::fmt;
use std::io::{self, BufRead, Read, Write};
use std::os::fd::{AsRawFd, RawFd};

use super::{
    StreamFlags, fill_with, get_with, peek_with, put_with, putback_with, read_with, unget_with,
    write_with,
};
use crate::counter::{ByteCount, CountSink, NoCount};
use crate::duplex::DuplexBuffer;
use crate::read_buffer::Refill;

/// [`Read`] + [`BufRead`] + [`Write`] over one descriptor, typically a
/// socket.
pub struct DuplexStream<R = NoCount, W = NoCount> {
    buffer: DuplexBuffer<R, W>,
    flags: StreamFlags,
}

/// Duplex stream counting both directions.
pub type CountedDuplexStream<R = ByteCount, W = ByteCount> = DuplexStream<R, W>;

impl DuplexStream<NoCount, NoCount> {
    /// Creates a detached stream.
    pub fn new() -> Self {
        Self::with_counters(NoCount, NoCount)
    }

    /// Creates a stream over `fd`.
    pub fn from_fd(fd: RawFd) -> Self {
        Self::with_counters_fd(NoCount, NoCount, fd)
    }
}

impl Default for DuplexStream<NoCount, NoCount> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> DuplexStream<R, W>
where
    R: CountSink,
    W: CountSink,
{
    /// Creates a detached stream with inbound and outbound counters.
    pub fn with_counters(read_counter: R, write_counter: W) -> Self {
        Self {
            buffer: DuplexBuffer::with_counters(read_counter, write_counter),
            flags: StreamFlags::default(),
        }
    }

    /// Creates a stream over `fd` with inbound and outbound counters.
    pub fn with_counters_fd(read_counter: R, write_counter: W, fd: RawFd) -> Self {
        Self {
            buffer: DuplexBuffer::with_counters_fd(read_counter, write_counter, fd),
            flags: StreamFlags::default(),
        }
    }

    /// Attaches `fd` for both directions and clears the flags.
    pub fn attach(&mut self, fd: RawFd) -> Option<RawFd> {
        self.flags = StreamFlags::default();
        self.buffer.attach(fd)
    }

    /// Detaches the descriptor without closing it.
    pub fn detach(&mut self) -> Option<RawFd> {
        self.buffer.detach()
    }

    /// Flushes, clears the flags and closes the shared descriptor.
    pub fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.flags = StreamFlags::default();
        self.buffer.close().map_err(io::Error::from)
    }

    /// Reports whether a descriptor is attached.
    pub const fn is_attached(&self) -> bool {
        self.buffer.is_attached()
    }

    /// Current stream flags.
    pub const fn flags(&self) -> StreamFlags {
        self.flags
    }

    /// Whether end of file was reached.
    pub const fn eof(&self) -> bool {
        self.flags.eof
    }

    /// Whether an operation failed.
    pub const fn fail(&self) -> bool {
        self.flags.fail
    }

    /// Whether no flag is set.
    pub const fn good(&self) -> bool {
        self.flags.good()
    }

    /// Resets both flags.
    pub fn clear(&mut self) {
        self.flags = StreamFlags::default();
    }

    /// Reads one byte; `None` at end of file.
    pub fn get(&mut self) -> io::Result<Option<u8>> {
        get_with(&mut self.buffer, &mut self.flags)
    }

    /// Looks at the next byte without consuming it.
    pub fn peek(&mut self) -> io::Result<Option<u8>> {
        peek_with(&mut self.buffer, &mut self.flags)
    }

    /// Pushes the last consumed byte back.
    pub fn unget(&mut self) -> bool {
        unget_with(&mut self.buffer, &mut self.flags)
    }

    /// Pushes `byte` back if it matches the last consumed byte.
    pub fn putback(&mut self, byte: u8) -> bool {
        putback_with(&mut self.buffer, &mut self.flags, byte)
    }

    /// Writes one byte through the single-byte path.
    pub fn put(&mut self, byte: u8) -> io::Result<()> {
        put_with(&mut self.buffer, &mut self.flags, byte)
    }

    /// The underlying buffer.
    pub const fn buffer(&self) -> &DuplexBuffer<R, W> {
        &self.buffer
    }
}

impl<R, W> Read for DuplexStream<R, W>
where
    R: CountSink,
    W: CountSink,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_with(&mut self.buffer, &mut self.flags, buf)
    }
}

impl<R, W> BufRead for DuplexStream<R, W>
where
    R: CountSink,
    W: CountSink,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        fill_with(&mut self.buffer, &mut self.flags)
    }

    fn consume(&mut self, amt: usize) {
        self.buffer.window_mut().consume(amt);
    }
}

impl<R, W> Write for DuplexStream<R, W>
where
    R: CountSink,
    W: CountSink,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        write_with(&mut self.buffer, &mut self.flags, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<R, W> AsRawFd for DuplexStream<R, W>
where
    R: CountSink,
    W: CountSink,
{
    fn as_raw_fd(&self) -> RawFd {
        self.buffer.fd()
    }
}

impl<R, W> fmt::Debug for DuplexStream<R, W>
where
    R: CountSink,
    W: CountSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplexStream")
            .field("fd", &self.buffer.fd())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
