//! crates/logging-sink/src/file_sink.rs
//!
//! A [`LogSink`] bound to a file, degrading to standard error when the file
//! cannot be opened.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use logging::{LogError, LogResult, Priority, SinkConfig};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::sink::LogSink;

/// How an existing log file is treated on open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenMode {
    /// Keep existing content and add lines at the end.
    #[default]
    Append,
    /// Discard existing content.
    Truncate,
}

impl OpenMode {
    fn open(self, path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true);
        match self {
            Self::Append => options.append(true),
            Self::Truncate => options.write(true).truncate(true),
        };
        options.open(path)
    }
}

/// A [`LogSink`] that owns its log file.
///
/// Dereferences to [`LogSink`], so handles bind to it directly.
///
/// # Examples
///
/// ```
/// use logging::{Priority, SinkConfig};
/// use logging_sink::{FileLogSink, LogHandle, OpenMode};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("service.log");
/// let sink = FileLogSink::open(&path, OpenMode::Truncate, SinkConfig::plain(Priority::Notice));
/// assert_eq!(sink.path().as_deref(), Some(path.as_path()));
///
/// LogHandle::new(&sink).log(Priority::Warn, "low disk").unwrap();
/// sink.close();
/// assert_eq!(std::fs::read_to_string(&path).unwrap(), "low disk\n");
/// ```
pub struct FileLogSink {
    sink: LogSink,
    path: Mutex<Option<PathBuf>>,
}

impl FileLogSink {
    /// Opens `path` and binds the sink to it.
    ///
    /// Construction never fails: when the file cannot be opened the sink
    /// binds standard error instead and reports the failure there as an
    /// `ERROR` line.
    pub fn open<P>(path: P, mode: OpenMode, config: SinkConfig) -> Self
    where
        P: AsRef<Path>,
    {
        let file_sink = Self {
            sink: LogSink::unbound(config),
            path: Mutex::new(None),
        };
        if let Err(source) = file_sink.bind_file(path.as_ref(), mode) {
            file_sink.fall_back(path.as_ref(), &source);
        }
        file_sink
    }

    /// Closes the current file, then opens `path`.
    ///
    /// # Errors
    ///
    /// [`LogError::OpenFile`] when `path` cannot be opened. The sink is bound
    /// to standard error by then and remains usable.
    pub fn set_file<P>(&self, path: P, mode: OpenMode) -> LogResult<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let _guard = self.sink.lock();
        self.close();
        self.bind_file(path, mode).map_err(|source| {
            self.fall_back(path, &source);
            LogError::OpenFile {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Closes the file and unbinds the sink.
    pub fn close(&self) {
        let _guard = self.sink.lock();
        self.sink.close();
        if let Some(path) = self.path.lock().take() {
            debug!(path = %path.display(), "closed log file");
        }
    }

    /// The file currently bound; `None` after a fallback or close.
    pub fn path(&self) -> Option<PathBuf> {
        self.path.lock().clone()
    }

    /// The underlying sink.
    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    fn bind_file(&self, path: &Path, mode: OpenMode) -> io::Result<()> {
        let file = mode.open(path)?;
        let _guard = self.sink.lock();
        self.sink.bind(file);
        *self.path.lock() = Some(path.to_path_buf());
        debug!(path = %path.display(), ?mode, "opened log file");
        Ok(())
    }

    fn fall_back(&self, path: &Path, source: &io::Error) {
        warn!(
            path = %path.display(),
            error = %source,
            "log file unavailable, falling back to standard error"
        );
        let _guard = self.sink.lock();
        self.sink.bind(io::stderr());
        *self.path.lock() = None;
        let _ = self.sink.emit(
            Priority::Error,
            &format!("cannot open log file {}: {source}", path.display()),
        );
    }
}

impl Deref for FileLogSink {
    type Target = LogSink;

    fn deref(&self) -> &LogSink {
        &self.sink
    }
}

impl fmt::Debug for FileLogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLogSink")
            .field("path", &*self.path.lock())
            .field("sink", &self.sink)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogHandle;
    use std::fs;

    fn plain() -> SinkConfig {
        SinkConfig::plain(Priority::Notice)
    }

    #[test]
    fn append_mode_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "earlier\n").unwrap();

        let sink = FileLogSink::open(&path, OpenMode::Append, plain());
        sink.emit(Priority::Notice, "later").unwrap();
        sink.close();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
    }

    #[test]
    fn truncate_mode_discards_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "stale\n").unwrap();

        let sink = FileLogSink::open(&path, OpenMode::Truncate, plain());
        sink.emit(Priority::Notice, "fresh").unwrap();
        sink.close();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn unopenable_path_falls_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");

        let sink = FileLogSink::open(&path, OpenMode::Append, plain());

        assert!(sink.is_open());
        assert_eq!(sink.path(), None);
        assert!(!path.exists());
    }

    #[test]
    fn set_file_switches_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.log");
        let second = dir.path().join("second.log");

        let sink = FileLogSink::open(&first, OpenMode::Append, plain());
        let handle = LogHandle::new(&sink);
        handle.log(Priority::Notice, "one").unwrap();
        sink.set_file(&second, OpenMode::Append).unwrap();
        handle.log(Priority::Notice, "two").unwrap();
        sink.close();

        assert_eq!(fs::read_to_string(&first).unwrap(), "one\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "two\n");
    }

    #[test]
    fn set_file_failure_reports_and_stays_usable() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.log");
        let bad = dir.path().join("absent").join("bad.log");

        let sink = FileLogSink::open(&good, OpenMode::Append, plain());
        let err = sink.set_file(&bad, OpenMode::Append).unwrap_err();

        assert!(matches!(err, LogError::OpenFile { ref path, .. } if path == &bad));
        assert!(sink.is_open());
        assert_eq!(sink.path(), None);
    }

    #[test]
    fn close_unbinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let sink = FileLogSink::open(&path, OpenMode::Append, plain());
        sink.close();

        assert!(!sink.is_open());
        assert_eq!(sink.path(), None);
        assert!(matches!(sink.emit(Priority::Error, "x"), Err(LogError::Closed)));
    }
}
