//! crates/fd_io/src/descriptor.rs
//! Descriptor slot shared by every buffer kind.

use std::io;
use std::os::fd::RawFd;

use tracing::debug;

/// Sentinel stored while no descriptor is attached.
pub const DETACHED: RawFd = -1;

/// Owns one raw descriptor slot.
///
/// The slot is either [`DETACHED`] or holds a descriptor handed over by
/// [`attach`](Self::attach). Dropping the state does not close the
/// descriptor.
#[derive(Debug, PartialEq, Eq)]
pub struct DescriptorState {
    fd: RawFd,
}

impl DescriptorState {
    /// Creates a detached slot.
    pub const fn new() -> Self {
        Self { fd: DETACHED }
    }

    /// Creates a slot already holding `fd`.
    pub const fn with_fd(fd: RawFd) -> Self {
        Self { fd }
    }

    /// The attached descriptor, or [`DETACHED`].
    pub const fn raw(&self) -> RawFd {
        self.fd
    }

    /// Reports whether a descriptor is attached.
    pub const fn is_attached(&self) -> bool {
        self.fd != DETACHED
    }

    /// Stores `fd`, returning the previously attached descriptor without
    /// closing it.
    pub fn attach(&mut self, fd: RawFd) -> Option<RawFd> {
        debug!(fd, "attaching descriptor");
        let previous = self.detach_quietly();
        self.fd = fd;
        previous
    }

    /// Releases the descriptor to the caller without closing it.
    pub fn detach(&mut self) -> Option<RawFd> {
        let previous = self.detach_quietly();
        if let Some(fd) = previous {
            debug!(fd, "detached descriptor");
        }
        previous
    }

    /// Closes the attached descriptor and clears the slot.
    ///
    /// Closing a detached slot succeeds without a system call, so `close`
    /// may be repeated freely and the slot reused with `attach`.
    pub fn close(&mut self) -> io::Result<()> {
        match self.detach_quietly() {
            Some(fd) => {
                debug!(fd, "closing descriptor");
                platform::close(fd)
            }
            None => Ok(()),
        }
    }

    fn detach_quietly(&mut self) -> Option<RawFd> {
        let fd = std::mem::replace(&mut self.fd, DETACHED);
        (fd != DETACHED).then_some(fd)
    }
}

impl Default for DescriptorState {
    fn default() -> Self {
        Self::new()
    }
}
