//! crates/fd_io/src/duplex.rs
//!
//! Bidirectional buffer over a single descriptor.
//!
//! Rather than composing a [`ReadBuffer`](crate::ReadBuffer) and a
//! [`WriteBuffer`](crate::WriteBuffer) that would each own a descriptor,
//! [`DuplexBuffer`] owns one [`DescriptorState`] and implements both the
//! [`Refill`] and [`WriteThrough`] capabilities on top of it. Attaching,
//! detaching, or closing therefore always affects both directions at once.

use std::os::fd::RawFd;

use crate::counter::{ByteCount, CountSink, NoCount};
use crate::descriptor::DescriptorState;
use crate::error::{FdError, FdResult};
use crate::read_buffer::{Fill, ReadWindow, Refill, refill_window};
use crate::write_buffer::{WriteThrough, write_byte_to, write_through_to};

/// Read/write buffer sharing one descriptor.
///
/// `R` counts inbound bytes, `W` counts outbound bytes.
#[derive(Debug)]
pub struct DuplexBuffer<R = NoCount, W = NoCount> {
    fd: DescriptorState,
    window: ReadWindow,
    read_counter: R,
    write_counter: W,
}

/// Duplex buffer counting both directions.
pub type CountedDuplexBuffer<R = ByteCount, W = ByteCount> = DuplexBuffer<R, W>;

impl DuplexBuffer<NoCount, NoCount> {
    /// Creates a detached, uncounted buffer.
    pub fn new() -> Self {
        Self::with_counters(NoCount, NoCount)
    }

    /// Creates an uncounted buffer attached to `fd`.
    pub fn from_fd(fd: RawFd) -> Self {
        Self::with_counters_fd(NoCount, NoCount, fd)
    }
}

impl Default for DuplexBuffer<NoCount, NoCount> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> DuplexBuffer<R, W>
where
    R: CountSink,
    W: CountSink,
{
    /// Creates a detached buffer with separate inbound and outbound counters.
    pub fn with_counters(read_counter: R, write_counter: W) -> Self {
        Self {
            fd: DescriptorState::new(),
            window: ReadWindow::new(),
            read_counter,
            write_counter,
        }
    }

    /// Creates a buffer attached to `fd` with separate counters.
    pub fn with_counters_fd(read_counter: R, write_counter: W, fd: RawFd) -> Self {
        Self {
            fd: DescriptorState::with_fd(fd),
            window: ReadWindow::new(),
            read_counter,
            write_counter,
        }
    }

    /// The shared descriptor slot.
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

    /// Attaches `fd` for both directions, discarding buffered input.
    pub fn attach(&mut self, fd: RawFd) -> Option<RawFd> {
        self.window.reset();
        self.fd.attach(fd)
    }

    /// Detaches the descriptor from both directions without closing it.
    pub fn detach(&mut self) -> Option<RawFd> {
        self.window.reset();
        self.fd.detach()
    }

    /// Closes the shared descriptor through the read side's close path.
    pub fn close(&mut self) -> FdResult<()> {
        self.window.reset();
        let fd = self.fd.raw();
        self.fd.close().map_err(|source| FdError::io("close", fd, source))
    }

    /// Inbound counter.
    pub const fn read_counter(&self) -> &R {
        &self.read_counter
    }

    /// Outbound counter.
    pub const fn write_counter(&self) -> &W {
        &self.write_counter
    }

    /// Consumes the buffer, returning `(inbound, outbound)` counters. The
    /// descriptor is left open.
    pub fn into_counters(self) -> (R, W) {
        (self.read_counter, self.write_counter)
    }
}

impl<R, W> Refill for DuplexBuffer<R, W>
where
    R: CountSink,
    W: CountSink,
{
    fn refill(&mut self) -> FdResult<Fill> {
        refill_window(&self.fd, &mut self.window, &mut self.read_counter)
    }

    fn window(&self) -> &ReadWindow {
        &self.window
    }

    fn window_mut(&mut self) -> &mut ReadWindow {
        &mut self.window
    }
}

impl<R, W> WriteThrough for DuplexBuffer<R, W>
where
    R: CountSink,
    W: CountSink,
{
    fn write_byte(&mut self, byte: u8) -> FdResult<()> {
        write_byte_to(&self.fd, &mut self.write_counter, byte)
    }

    fn write_through(&mut self, bytes: &[u8]) -> FdResult<usize> {
        write_through_to(&self.fd, &mut self.write_counter, bytes)
    }
}
