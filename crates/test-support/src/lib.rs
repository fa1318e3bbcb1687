//! crates/test-support/src/lib.rs
//!
//! Shared test utilities for the fdlog workspace.
//!
//! Provides descriptor fixtures that close themselves on drop and an
//! in-memory writer whose contents remain readable after it has been moved
//! into a sink.

#![deny(unsafe_code)]

use std::io::{self, Write};
use std::os::fd::RawFd;
use std::sync::Arc;

use parking_lot::Mutex;

pub use tempfile;

/// Both ends of an anonymous pipe. Ends still owned at drop time are closed.
#[derive(Debug)]
pub struct Pipe {
    read: Option<RawFd>,
    write: Option<RawFd>,
}

impl Pipe {
    /// Opens a fresh pipe.
    ///
    /// # Panics
    ///
    /// Panics when the process is out of descriptors.
    pub fn new() -> Self {
        let (read, write) = platform::pipe().expect("pipe(2) failed");
        Self {
            read: Some(read),
            write: Some(write),
        }
    }

    /// Descriptor of the read end.
    pub fn read_fd(&self) -> RawFd {
        self.read.unwrap_or(-1)
    }

    /// Descriptor of the write end.
    pub fn write_fd(&self) -> RawFd {
        self.write.unwrap_or(-1)
    }

    /// Gives up ownership of the read end; the caller must close it.
    pub fn take_read(&mut self) -> RawFd {
        self.read.take().unwrap_or(-1)
    }

    /// Gives up ownership of the write end; the caller must close it.
    pub fn take_write(&mut self) -> RawFd {
        self.write.take().unwrap_or(-1)
    }

    /// Closes the write end so readers observe end of file.
    pub fn close_write(&mut self) {
        if let Some(fd) = self.write.take() {
            let _ = platform::close(fd);
        }
    }

    /// Writes `bytes` into the pipe through the raw write end.
    ///
    /// # Panics
    ///
    /// Panics when the write end was taken or the write is short.
    pub fn feed(&self, bytes: &[u8]) {
        let fd = self.write.expect("write end already taken");
        let written = platform::write(fd, bytes).expect("write(2) failed");
        assert_eq!(written, bytes.len(), "short write into test pipe");
    }

    /// Reads whatever is currently buffered in the pipe, up to `max` bytes.
    ///
    /// # Panics
    ///
    /// Panics when the read end was taken or the read fails.
    pub fn drain(&self, max: usize) -> Vec<u8> {
        let fd = self.read.expect("read end already taken");
        let mut buf = vec![0u8; max];
        let n = platform::read(fd, &mut buf).expect("read(2) failed");
        buf.truncate(n);
        buf
    }
}

impl Default for Pipe {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Pipe {
    fn drop(&mut self) {
        for fd in [self.read.take(), self.write.take()].into_iter().flatten() {
            let _ = platform::close(fd);
        }
    }
}

/// A connected socket pair. Ends still owned at drop time are closed.
#[derive(Debug)]
pub struct SocketPair {
    left: Option<RawFd>,
    right: Option<RawFd>,
}

impl SocketPair {
    /// Opens a fresh Unix stream socket pair.
    ///
    /// # Panics
    ///
    /// Panics when the process is out of descriptors.
    pub fn new() -> Self {
        let (left, right) = platform::socketpair().expect("socketpair(2) failed");
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    /// The first socket.
    pub fn left(&self) -> RawFd {
        self.left.unwrap_or(-1)
    }

    /// The second socket.
    pub fn right(&self) -> RawFd {
        self.right.unwrap_or(-1)
    }

    /// Gives up ownership of the first socket.
    pub fn take_left(&mut self) -> RawFd {
        self.left.take().unwrap_or(-1)
    }

    /// Gives up ownership of the second socket.
    pub fn take_right(&mut self) -> RawFd {
        self.right.take().unwrap_or(-1)
    }
}

impl Default for SocketPair {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SocketPair {
    fn drop(&mut self) {
        for fd in [self.left.take(), self.right.take()].into_iter().flatten() {
            let _ = platform::close(fd);
        }
    }
}

/// Cloneable in-memory writer. Every clone appends to the same buffer.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().clone()
    }

    /// Everything written so far, decoded as UTF-8.
    ///
    /// # Panics
    ///
    /// Panics when the contents are not valid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8(self.contents()).expect("log output is UTF-8")
    }

    /// Lines written so far, without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that fails every call, for exercising error paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "writer rejects output"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "writer rejects output"))
    }
}
