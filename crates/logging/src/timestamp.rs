//! crates/logging/src/timestamp.rs
//! Millisecond wall-clock stamps for log lines.

use std::fmt;
use std::time::SystemTime;

use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

/// Rendering used inside the bracketed timestamp segment.
const LINE_TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]/[month padding:zero]/[day padding:zero] [hour padding:zero]:[minute padding:zero]:[second padding:zero]:[subsecond digits:3]"
);

/// A captured instant, rendered as `YYYY/MM/DD HH:MM:SS:mmm`.
///
/// [`now`](Self::now) asks `time` for the local offset and falls back to UTC
/// when it is unavailable. On Unix, `time` refuses to read the local offset
/// while the process has more than one thread. In practice, stamps taken
/// in any threaded program (a test harness included) are UTC, and only a
/// single-threaded process sees local time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Captures the current time; UTC once the process is multi-threaded.
    #[must_use]
    pub fn now() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self(now)
    }

    /// Wraps an existing instant.
    #[must_use]
    pub const fn from_datetime(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }

    /// The wrapped instant.
    #[must_use]
    pub const fn datetime(self) -> OffsetDateTime {
        self.0
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self(OffsetDateTime::from(time))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.0.format(LINE_TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
