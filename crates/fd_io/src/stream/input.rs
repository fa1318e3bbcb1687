//! crates/fd_io/src/stream/input.rs
//! Readable stream façade.

use std::fmt;
use std::io::{self, BufRead, Read};
use std::os::fd::{AsRawFd, RawFd};

use super::{StreamFlags, fill_with, get_with, peek_with, putback_with, read_with, unget_with};
use crate::counter::{ByteCount, CountSink, NoCount};
use crate::read_buffer::{ReadBuffer, Refill};

/// [`Read`] + [`BufRead`] over a raw descriptor.
///
/// # Examples
///
/// ```
/// use std::io::{BufRead, Read};
/// use fd_io::InputStream;
///
/// let (rd, wr) = platform::pipe()?;
/// platform::write(wr, b"first\nsecond\n")?;
/// platform::close(wr)?;
///
/// let mut input = InputStream::from_fd(rd);
/// let lines: Vec<String> = input.by_ref().lines().collect::<Result<_, _>>()?;
/// assert_eq!(lines, ["first", "second"]);
/// assert!(input.eof());
/// input.close()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct InputStream<C = NoCount> {
    buffer: ReadBuffer<C>,
    flags: StreamFlags,
}

/// Input stream counting every byte read from the descriptor.
pub type CountedInputStream<C = ByteCount> = InputStream<C>;

impl InputStream<NoCount> {
    /// Creates a detached stream.
    pub fn new() -> Self {
        Self::with_counter(NoCount)
    }

    /// Creates a stream reading from `fd`.
    pub fn from_fd(fd: RawFd) -> Self {
        Self::with_counter_fd(NoCount, fd)
    }
}

impl Default for InputStream<NoCount> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InputStream<C>
where
    C: CountSink,
{
    /// Creates a detached stream reporting to `counter`.
    pub fn with_counter(counter: C) -> Self {
        Self {
            buffer: ReadBuffer::with_counter(counter),
            flags: StreamFlags::default(),
        }
    }

    /// Creates a stream reading from `fd` and reporting to `counter`.
    pub fn with_counter_fd(counter: C, fd: RawFd) -> Self {
        Self {
            buffer: ReadBuffer::with_counter_fd(counter, fd),
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

    /// Clears the flags and closes the descriptor.
    pub fn close(&mut self) -> io::Result<()> {
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

    /// Pushes the last consumed byte back. Sets `fail` when nothing is left
    /// to push back.
    pub fn unget(&mut self) -> bool {
        unget_with(&mut self.buffer, &mut self.flags)
    }

    /// Pushes `byte` back if it matches the last consumed byte; otherwise
    /// sets `fail`.
    pub fn putback(&mut self, byte: u8) -> bool {
        putback_with(&mut self.buffer, &mut self.flags, byte)
    }

    /// The underlying buffer.
    pub const fn buffer(&self) -> &ReadBuffer<C> {
        &self.buffer
    }

    /// Mutable access to the underlying buffer.
    pub fn buffer_mut(&mut self) -> &mut ReadBuffer<C> {
        &mut self.buffer
    }

    /// The counter sink.
    pub const fn counter(&self) -> &C {
        self.buffer.counter()
    }
}

impl<C> Read for InputStream<C>
where
    C: CountSink,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_with(&mut self.buffer, &mut self.flags, buf)
    }
}

impl<C> BufRead for InputStream<C>
where
    C: CountSink,
{
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        fill_with(&mut self.buffer, &mut self.flags)
    }

    fn consume(&mut self, amt: usize) {
        self.buffer.window_mut().consume(amt);
    }
}

impl<C> AsRawFd for InputStream<C>
where
    C: CountSink,
{
    fn as_raw_fd(&self) -> RawFd {
        self.buffer.fd()
    }
}

impl<C> fmt::Debug for InputStream<C>
where
    C: CountSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputStream")
            .field("fd", &self.buffer.descriptor().raw())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
