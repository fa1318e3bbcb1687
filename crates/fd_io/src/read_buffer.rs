//! crates/fd_io/src/read_buffer.rs
//!
//! Refill-on-demand reader with a putback window.
//!
//! The region is laid out as `[putback | main]`. A refill moves up to
//! [`PUTBACK_CAPACITY`] of the most recently consumed bytes so they end
//! exactly at the start of the main window, then issues one `read(2)` into
//! the main window:
//!
//! ```text
//!  0     start   PUTBACK_CAPACITY          end
//!  |  ...  |##preserved##|=====fresh=====|   ...   |
//!                        ^pos
//! ```

use std::os::fd::RawFd;

use tracing::trace;

use crate::counter::{ByteCount, CountSink, NoCount};
use crate::descriptor::DescriptorState;
use crate::error::{FdError, FdResult};

/// Bytes of history kept in front of the main window for `unget`.
pub const PUTBACK_CAPACITY: usize = 4;

/// Bytes requested from the kernel per refill.
pub const MAIN_CAPACITY: usize = 1024;

const REGION_CAPACITY: usize = PUTBACK_CAPACITY + MAIN_CAPACITY;

/// Outcome of a refill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    /// Fresh data arrived; carries the next byte without consuming it.
    Ready(u8),
    /// The descriptor reported end of file.
    Eof,
    /// No descriptor is attached. Distinct from [`Fill::Eof`] so callers can
    /// tell a finished stream from an unbound one.
    Detached,
}

impl Fill {
    /// The peeked byte, if data is available.
    pub const fn byte(self) -> Option<u8> {
        match self {
            Self::Ready(byte) => Some(byte),
            Self::Eof | Self::Detached => None,
        }
    }
}

/// Fixed read region with `start <= pos <= end` cursors.
///
/// `[start, pos)` holds consumed bytes that may still be pushed back,
/// `[pos, end)` holds unread bytes.
#[derive(Clone)]
pub struct ReadWindow {
    region: Box<[u8]>,
    start: usize,
    pos: usize,
    end: usize,
}

impl ReadWindow {
    /// Creates an empty window with no putback history.
    pub fn new() -> Self {
        Self {
            region: vec![0u8; REGION_CAPACITY].into_boxed_slice(),
            start: PUTBACK_CAPACITY,
            pos: PUTBACK_CAPACITY,
            end: PUTBACK_CAPACITY,
        }
    }

    /// Discards buffered and putback bytes.
    pub fn reset(&mut self) {
        self.start = PUTBACK_CAPACITY;
        self.pos = PUTBACK_CAPACITY;
        self.end = PUTBACK_CAPACITY;
    }

    /// Unread bytes left in the window.
    pub const fn available(&self) -> usize {
        self.end - self.pos
    }

    /// Consumed bytes that can still be pushed back.
    pub const fn putback_available(&self) -> usize {
        self.pos - self.start
    }

    /// The unread bytes.
    pub fn buffered(&self) -> &[u8] {
        &self.region[self.pos..self.end]
    }

    /// The next unread byte, without consuming it.
    pub fn peek(&self) -> Option<u8> {
        (self.pos < self.end).then(|| self.region[self.pos])
    }

    /// Consumes and returns the next unread byte.
    pub fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Marks up to `amount` unread bytes as consumed.
    pub fn consume(&mut self, amount: usize) {
        self.pos += amount.min(self.available());
    }

    /// Copies unread bytes into `out`, returning how many were copied.
    pub fn take_into(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.available());
        out[..count].copy_from_slice(&self.region[self.pos..self.pos + count]);
        self.pos += count;
        count
    }

    /// Steps back over the last consumed byte.
    pub fn unget(&mut self) -> bool {
        if self.pos > self.start {
            self.pos -= 1;
            true
        } else {
            false
        }
    }

    /// Steps back only if the last consumed byte equals `byte`.
    pub fn putback(&mut self, byte: u8) -> bool {
        if self.pos > self.start && self.region[self.pos - 1] == byte {
            self.pos -= 1;
            true
        } else {
            false
        }
    }

    /// Moves the putback history in front of the main window and returns how
    /// many bytes were preserved.
    fn preserve_history(&mut self) -> usize {
        let preserved = self.putback_available().min(PUTBACK_CAPACITY);
        self.region
            .copy_within(self.pos - preserved..self.pos, PUTBACK_CAPACITY - preserved);
        preserved
    }

    fn main_window(&mut self) -> &mut [u8] {
        &mut self.region[PUTBACK_CAPACITY..]
    }

    fn commit(&mut self, preserved: usize, fresh: usize) {
        self.start = PUTBACK_CAPACITY - preserved;
        self.pos = PUTBACK_CAPACITY;
        self.end = PUTBACK_CAPACITY + fresh;
    }
}

impl Default for ReadWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReadWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadWindow")
            .field("start", &self.start)
            .field("pos", &self.pos)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

/// Refills `window` from `fd` with a single `read(2)`.
///
/// Shared by [`ReadBuffer`] and [`DuplexBuffer`](crate::DuplexBuffer), which
/// differ only in who owns the descriptor.
pub(crate) fn refill_window<C>(
    fd: &DescriptorState,
    window: &mut ReadWindow,
    counter: &mut C,
) -> FdResult<Fill>
where
    C: CountSink,
{
    if !fd.is_attached() {
        return Ok(Fill::Detached);
    }
    if let Some(byte) = window.peek() {
        return Ok(Fill::Ready(byte));
    }

    let preserved = window.preserve_history();
    let result = platform::read(fd.raw(), window.main_window());
    match result {
        Ok(0) => {
            trace!(fd = fd.raw(), "end of file");
            window.commit(preserved, 0);
            Ok(Fill::Eof)
        }
        Ok(read) => {
            trace!(fd = fd.raw(), read, preserved, "refilled read window");
            counter.record(read as u64);
            window.commit(preserved, read);
            Ok(Fill::Ready(window.region[PUTBACK_CAPACITY]))
        }
        Err(source) => {
            window.commit(preserved, 0);
            Err(FdError::io("read", fd.raw(), source))
        }
    }
}

/// Read capability: anything that can refill a [`ReadWindow`].
///
/// The provided methods implement the consumer side once for every buffer
/// kind.
pub trait Refill {
    /// Refills the window once [`ReadWindow::available`] is zero.
    ///
    /// While unread bytes remain nothing is read and the next byte is
    /// reported as [`Fill::Ready`].
    fn refill(&mut self) -> FdResult<Fill>;

    /// The buffered window.
    fn window(&self) -> &ReadWindow;

    /// Mutable access to the buffered window.
    fn window_mut(&mut self) -> &mut ReadWindow;

    /// Peeks at the next byte, refilling when the window is empty.
    fn peek_byte(&mut self) -> FdResult<Option<u8>> {
        match self.window().peek() {
            Some(byte) => Ok(Some(byte)),
            None => Ok(self.refill()?.byte()),
        }
    }

    /// Consumes the next byte, refilling when the window is empty.
    fn next_byte(&mut self) -> FdResult<Option<u8>> {
        if self.window().available() == 0 && self.refill()?.byte().is_none() {
            return Ok(None);
        }
        Ok(self.window_mut().bump())
    }

    /// Copies buffered bytes into `out`, refilling at most once.
    ///
    /// Returns zero only at end of file, when detached, or when `out` is
    /// empty.
    fn read_into(&mut self, out: &mut [u8]) -> FdResult<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.window().available() == 0 && self.refill()?.byte().is_none() {
            return Ok(0);
        }
        Ok(self.window_mut().take_into(out))
    }
}

/// Buffered reader over one descriptor.
///
/// `C` selects the plain ([`NoCount`]) or counted variant.
#[derive(Debug)]
pub struct ReadBuffer<C = NoCount> {
    fd: DescriptorState,
    window: ReadWindow,
    counter: C,
}

/// Read buffer that reports every refill to a [`CountSink`].
pub type CountedReadBuffer<C = ByteCount> = ReadBuffer<C>;

impl ReadBuffer<NoCount> {
    /// Creates a detached, uncounted buffer.
    pub fn new() -> Self {
        Self::with_counter(NoCount)
    }

    /// Creates an uncounted buffer attached to `fd`.
    pub fn from_fd(fd: RawFd) -> Self {
        Self::with_counter_fd(NoCount, fd)
    }
}

impl Default for ReadBuffer<NoCount> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ReadBuffer<C>
where
    C: CountSink,
{
    /// Creates a detached buffer reporting to `counter`.
    pub fn with_counter(counter: C) -> Self {
        Self {
            fd: DescriptorState::new(),
            window: ReadWindow::new(),
            counter,
        }
    }

    /// Creates a buffer attached to `fd` reporting to `counter`.
    pub fn with_counter_fd(counter: C, fd: RawFd) -> Self {
        Self {
            fd: DescriptorState::with_fd(fd),
            window: ReadWindow::new(),
            counter,
        }
    }

    /// The descriptor slot.
    pub const fn descriptor(&self) -> &DescriptorState {
        &self.fd
    }

    /// The attached descriptor, or [`DETACHED`](crate::DETACHED).
    pub const fn fd(&self) -> RawFd {
        self.fd.raw()
    }

    /// Reports whether a descriptor is attached.
    pub const fn is_attached(&self) -> bool {
        self.fd.is_attached()
    }

    /// Attaches `fd`, discarding any data buffered from the previous one.
    pub fn attach(&mut self, fd: RawFd) -> Option<RawFd> {
        self.window.reset();
        self.fd.attach(fd)
    }

    /// Detaches the descriptor without closing it.
    pub fn detach(&mut self) -> Option<RawFd> {
        self.window.reset();
        self.fd.detach()
    }

    /// Closes the descriptor and discards buffered data.
    pub fn close(&mut self) -> FdResult<()> {
        self.window.reset();
        let fd = self.fd.raw();
        self.fd.close().map_err(|source| FdError::io("close", fd, source))
    }

    /// The counter sink.
    pub const fn counter(&self) -> &C {
        &self.counter
    }

    /// Mutable access to the counter sink.
    pub fn counter_mut(&mut self) -> &mut C {
        &mut self.counter
    }

    /// Consumes the buffer, returning the counter. The descriptor is left
    /// open.
    pub fn into_counter(self) -> C {
        self.counter
    }
}

impl<C> Refill for ReadBuffer<C>
where
    C: CountSink,
{
    fn refill(&mut self) -> FdResult<Fill> {
        refill_window(&self.fd, &mut self.window, &mut self.counter)
    }

    fn window(&self) -> &ReadWindow {
        &self.window
    }

    fn window_mut(&mut self) -> &mut ReadWindow {
        &mut self.window
    }
}
