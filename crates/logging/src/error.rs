//! crates/logging/src/error.rs
//!
//! Error types for log sinks and the reentrant lock.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for logging operations.
pub type LogResult<T> = Result<T, LogError>;

/// Misuse of a [`ReentrantLock`](crate::ReentrantLock).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LockError {
    /// The calling thread tried to release a lock it does not hold.
    #[error("reentrant lock released by a thread that does not own it")]
    NotOwner,
}

/// Errors raised by sinks and handles.
#[derive(Debug, Error)]
pub enum LogError {
    /// A priority name matched none of the ten known names.
    #[error("unknown log priority: {name:?}")]
    UnknownPriority {
        /// The rejected name.
        name: String,
    },
    /// The sink has no bound output stream.
    #[error("log sink is closed")]
    Closed,
    /// A log file could not be opened. The sink has already fallen back to
    /// standard error when this is returned.
    #[error("failed to open log file {}: {source}", path.display())]
    OpenFile {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying open error.
        #[source]
        source: io::Error,
    },
    /// Writing or flushing a line failed.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// Lock misuse.
    #[error(transparent)]
    Lock(#[from] LockError),
}

impl LogError {
    /// Whether the error stems from configuration rather than I/O: an
    /// unknown priority name or a sink with no bound stream.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::UnknownPriority { .. } | Self::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::ErrorKind;

    #[test]
    fn unknown_priority_quotes_name() {
        let err = LogError::UnknownPriority {
            name: "loud".to_owned(),
        };
        assert_eq!(err.to_string(), "unknown log priority: \"loud\"");
        assert!(err.is_configuration());
    }

    #[test]
    fn closed_is_configuration_error() {
        assert!(LogError::Closed.is_configuration());
        assert!(!LogError::from(io::Error::other("disk")).is_configuration());
    }

    #[test]
    fn open_file_names_path_and_keeps_source() {
        let err = LogError::OpenFile {
            path: PathBuf::from("/nonexistent/log.txt"),
            source: io::Error::new(ErrorKind::NotFound, "missing"),
        };
        let message = err.to_string();
        assert!(message.contains("/nonexistent/log.txt"));
        assert!(message.contains("missing"));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_error_converts_with_source() {
        let err: LogError = io::Error::new(ErrorKind::BrokenPipe, "pipe").into();
        assert!(matches!(err, LogError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn lock_error_is_transparent() {
        let err: LogError = LockError::NotOwner.into();
        assert_eq!(err.to_string(), LockError::NotOwner.to_string());
    }
}
