//! crates/fd_io/src/write_buffer.rs
//! Unbuffered write-through writer.

use std::os::fd::RawFd;

use crate::counter::{ByteCount, CountSink, NoCount};
use crate::descriptor::DescriptorState;
use crate::error::{FdError, FdResult};

/// Writes one byte with a single `write(2)`.
///
/// The counter only sees the byte once the kernel confirmed it.
pub(crate) fn write_byte_to<C>(fd: &DescriptorState, counter: &mut C, byte: u8) -> FdResult<()>
where
    C: CountSink,
{
    if !fd.is_attached() {
        return Err(FdError::NotAttached);
    }
    match platform::write(fd.raw(), &[byte]) {
        Ok(1) => {
            counter.record(1);
            Ok(())
        }
        Ok(written) => Err(FdError::ShortWrite {
            fd: fd.raw(),
            requested: 1,
            written,
        }),
        Err(source) => Err(FdError::io("write", fd.raw(), source)),
    }
}

/// Writes `bytes` with a single `write(2)`; anything short is an error.
///
/// Bytes the kernel did accept are still recorded before a short write is
/// reported, so the counter matches what actually reached the descriptor.
pub(crate) fn write_through_to<C>(
    fd: &DescriptorState,
    counter: &mut C,
    bytes: &[u8],
) -> FdResult<usize>
where
    C: CountSink,
{
    if bytes.is_empty() {
        return Ok(0);
    }
    if !fd.is_attached() {
        return Err(FdError::NotAttached);
    }
    let written = platform::write(fd.raw(), bytes)
        .map_err(|source| FdError::io("write", fd.raw(), source))?;
    counter.record(written as u64);
    if written == bytes.len() {
        Ok(written)
    } else {
        Err(FdError::ShortWrite {
            fd: fd.raw(),
            requested: bytes.len(),
            written,
        })
    }
}

/// Write capability: pushes bytes straight to a descriptor.
pub trait WriteThrough {
    /// Writes a single byte.
    ///
    /// A detached buffer reports [`FdError::NotAttached`]; any other error is
    /// fatal for the stream.
    fn write_byte(&mut self, byte: u8) -> FdResult<()>;

    /// Writes all of `bytes` in one system call and returns `bytes.len()`.
    fn write_through(&mut self, bytes: &[u8]) -> FdResult<usize>;
}

/// Write-through writer over one descriptor.
///
/// `C` selects the plain ([`NoCount`]) or counted variant.
#[derive(Debug)]
pub struct WriteBuffer<C = NoCount> {
    fd: DescriptorState,
    counter: C,
}

/// Write buffer that reports every confirmed write to a [`CountSink`].
pub type CountedWriteBuffer<C = ByteCount> = WriteBuffer<C>;

impl WriteBuffer<NoCount> {
    /// Creates a detached, uncounted writer.
    pub fn new() -> Self {
        Self::with_counter(NoCount)
    }

    /// Creates an uncounted writer attached to `fd`.
    pub fn from_fd(fd: RawFd) -> Self {
        Self::with_counter_fd(NoCount, fd)
    }
}

impl Default for WriteBuffer<NoCount> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> WriteBuffer<C>
where
    C: CountSink,
{
    /// Creates a detached writer reporting to `counter`.
    pub fn with_counter(counter: C) -> Self {
        Self {
            fd: DescriptorState::new(),
            counter,
        }
    }

    /// Creates a writer attached to `fd` reporting to `counter`.
    pub fn with_counter_fd(counter: C, fd: RawFd) -> Self {
        Self {
            fd: DescriptorState::with_fd(fd),
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

    /// Attaches `fd`, returning the previous descriptor unclosed.
    pub fn attach(&mut self, fd: RawFd) -> Option<RawFd> {
        self.fd.attach(fd)
    }

    /// Detaches the descriptor without closing it.
    pub fn detach(&mut self) -> Option<RawFd> {
        self.fd.detach()
    }

    /// Closes the descriptor.
    pub fn close(&mut self) -> FdResult<()> {
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

    /// Consumes the writer, returning the counter. The descriptor is left
    /// open.
    pub fn into_counter(self) -> C {
        self.counter
    }
}

impl<C> WriteThrough for WriteBuffer<C>
where
    C: CountSink,
{
    fn write_byte(&mut self, byte: u8) -> FdResult<()> {
        write_byte_to(&self.fd, &mut self.counter, byte)
    }

    fn write_through(&mut self, bytes: &[u8]) -> FdResult<usize> {
        write_through_to(&self.fd, &mut self.counter, bytes)
    }
}
