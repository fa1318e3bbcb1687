//! crates/logging/src/priority.rs
//! The ten log priorities, most severe first.

use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

/// Severity of a log message.
///
/// Variants are declared most severe first, so the derived ordering treats
/// [`Priority::Catastrophic`] as the smallest value. A threshold names the
/// least severe priority a sink still emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[repr(u8)]
pub enum Priority {
    /// The process cannot continue in any form.
    Catastrophic = 0,
    /// An unrecoverable failure.
    Fatal = 1,
    /// A failure needing immediate attention.
    Critical = 2,
    /// An operation failed.
    Error = 3,
    /// Something unexpected that did not stop the operation.
    Warn = 4,
    /// Normal but noteworthy events. The default threshold.
    #[default]
    Notice = 5,
    /// Diagnostic detail.
    Debug = 6,
    /// Finer diagnostic detail.
    Debug1 = 7,
    /// Finest diagnostic detail.
    Debug2 = 8,
    /// Diagnostics about the logging machinery itself.
    EvenLoggingTheLogging = 9,
}

const NAMES: [&str; 10] = [
    "CATASTROPHIC",
    "FATAL",
    "CRITICAL",
    "ERROR",
    "WARN",
    "NOTICE",
    "DEBUG",
    "DEBUG1",
    "DEBUG2",
    "EVEN_LOGGING_THE_LOGGING",
];

impl Priority {
    /// Every priority in ordinal order.
    pub const ALL: [Self; 10] = [
        Self::Catastrophic,
        Self::Fatal,
        Self::Critical,
        Self::Error,
        Self::Warn,
        Self::Notice,
        Self::Debug,
        Self::Debug1,
        Self::Debug2,
        Self::EvenLoggingTheLogging,
    ];

    /// Position on the scale; 0 is the most severe.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// The priority at `ordinal`, if one exists.
    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        if (ordinal as usize) < Self::ALL.len() {
            Some(Self::ALL[ordinal as usize])
        } else {
            None
        }
    }

    /// Upper-case name used in log lines and accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        NAMES[self as usize]
    }

    /// Whether a message of this priority passes a sink gated at `threshold`.
    #[must_use]
    pub const fn passes(self, threshold: Self) -> bool {
        self.ordinal() <= threshold.ordinal()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Priority {
    type Err = LogError;

    /// Exact, case-sensitive lookup against [`Priority::name`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.name() == s)
            .ok_or_else(|| LogError::UnknownPriority {
                name: s.to_owned(),
            })
    }
}
