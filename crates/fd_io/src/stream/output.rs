//! crates/fd_io/src/stream/output.rs
//! Writable stream façade.

use std::fmt;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, RawFd};

use super::{StreamFlags, put_with, write_with};
use crate::counter::{ByteCount, CountSink, NoCount};
use crate::write_buffer::WriteBuffer;

/// [`Write`] over a raw descriptor. Every write reaches the descriptor before
/// the call returns, so [`flush`](Write::flush) has nothing to do.
///
/// # Short writes
///
/// Each [`write`](Write::write) is a single `write(2)` that must take the
/// whole slice. When the kernel accepts only a prefix, the call fails with
/// [`io::ErrorKind::WriteZero`] and sets `fail`, even though the prefix has
/// already reached the descriptor. This departs from the usual [`Write`]
/// contract, where a partial transfer is reported as `Ok(n)`. The counter
/// records the accepted prefix, so callers that need to resume can read the
/// exact position from it.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use fd_io::OutputStream;
///
/// let (rd, wr) = platform::pipe()?;
/// let mut output = OutputStream::from_fd(wr);
/// write!(output, "{}-{}", 4, 2)?;
/// output.close()?;
///
/// let mut buf = [0u8; 8];
/// let n = platform::read(rd, &mut buf)?;
/// assert_eq!(&buf[..n], b"4-2");
/// platform::close(rd)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct OutputStream<C = NoCount> {
    buffer: WriteBuffer<C>,
    flags: StreamFlags,
}

/// Output stream counting every byte written to the descriptor.
pub type CountedOutputStream<C = ByteCount> = OutputStream<C>;

impl OutputStream<NoCount> {
    /// Creates a detached stream.
    pub fn new() -> Self {
        Self::with_counter(NoCount)
    }

    /// Creates a stream writing to `fd`.
    pub fn from_fd(fd: RawFd) -> Self {
        Self::with_counter_fd(NoCount, fd)
    }
}

impl Default for OutputStream<NoCount> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> OutputStream<C>
where
    C: CountSink,
{
    /// Creates a detached stream reporting to `counter`.
    pub fn with_counter(counter: C) -> Self {
        Self {
            buffer: WriteBuffer::with_counter(counter),
            flags: StreamFlags::default(),
        }
    }

    /// Creates a stream writing to `fd` and reporting to `counter`.
    pub fn with_counter_fd(counter: C, fd: RawFd) -> Self {
        Self {
            buffer: WriteBuffer::with_counter_fd(counter, fd),
            flags: StreamFlags::default(),
        }
    }

    /// Attaches `fd` and clears the stream flags.
    pub fn attach(&mut self, fd: RawFd) -> Option<RawFd> {
        self.flags = StreamFlags::default();
        self.buffer.attach(fd)
    }

    /// Detaches the descriptor without closing it.
    pub fn detach(&mut self) -> Option<RawFd> {
        self.buffer.detach()
    }

    /// Flushes, clears the flags and closes the descriptor.
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

    /// Writes one byte through the single-byte path.
    pub fn put(&mut self, byte: u8) -> io::Result<()> {
        put_with(&mut self.buffer, &mut self.flags, byte)
    }

    /// The underlying buffer.
    pub const fn buffer(&self) -> &WriteBuffer<C> {
        &self.buffer
    }

    /// The counter sink.
    pub const fn counter(&self) -> &C {
        self.buffer.counter()
    }
}

impl<C> Write for OutputStream<C>
where
    C: CountSink,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        write_with(&mut self.buffer, &mut self.flags, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C> AsRawFd for OutputStream<C>
where
    C: CountSink,
{
    fn as_raw_fd(&self) -> RawFd {
        self.buffer.fd()
    }
}

impl<C> fmt::Debug for OutputStream<C>
where
    C: CountSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStream")
            .field("fd", &self.buffer.fd())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
