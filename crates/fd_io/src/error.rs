//! crates/fd_io/src/error.rs
//!
//! Error types for descriptor buffers.

use std::io;
use std::os::fd::RawFd;

use thiserror::Error;

/// Result type for descriptor buffer operations.
pub type FdResult<T> = Result<T, FdError>;

/// Errors raised by the buffering layer.
///
/// End of file is not an error; it is reported through
/// [`Fill::Eof`](crate::Fill::Eof).
#[derive(Debug, Error)]
pub enum FdError {
    /// A `read(2)`/`write(2)`/`close(2)` call returned a negative result.
    #[error("{op} on descriptor {fd} failed: {source}")]
    Io {
        /// The system call that failed.
        op: &'static str,
        /// Descriptor the call was issued against.
        fd: RawFd,
        /// The OS error, including its errno.
        #[source]
        source: io::Error,
    },
    /// The kernel accepted fewer bytes than requested.
    #[error("short write on descriptor {fd}: requested {requested} bytes, wrote {written}")]
    ShortWrite {
        /// Descriptor the write was issued against.
        fd: RawFd,
        /// Bytes handed to the kernel.
        requested: usize,
        /// Bytes the kernel reported as written.
        written: usize,
    },
    /// The buffer has no descriptor attached.
    #[error("stream is not attached to a descriptor")]
    NotAttached,
}

impl FdError {
    pub(crate) fn io(op: &'static str, fd: RawFd, source: io::Error) -> Self {
        Self::Io { op, fd, source }
    }

    /// Returns the errno carried by an [`FdError::Io`], if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

impl From<FdError> for io::Error {
    fn from(err: FdError) -> Self {
        match err {
            FdError::Io { source, .. } => source,
            FdError::ShortWrite { .. } => Self::new(io::ErrorKind::WriteZero, err),
            FdError::NotAttached => Self::new(io::ErrorKind::NotConnected, err),
        }
    }
}
