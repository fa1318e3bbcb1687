//! crates/logging/src/config.rs
//! Per-sink gating and formatting configuration.

use crate::priority::Priority;

/// Threshold and line-format switches for one sink.
///
/// The defaults emit `NOTICE` and everything more severe, with both the
/// timestamp and the priority tag present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SinkConfig {
    /// Least severe priority still emitted.
    pub threshold: Priority,
    /// Prefix each line with `[YYYY/MM/DD HH:MM:SS:mmm]`.
    pub timestamps: bool,
    /// Prefix each line with `[PRIORITY]`.
    pub priority_tags: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            threshold: Priority::Notice,
            timestamps: true,
            priority_tags: true,
        }
    }
}

impl SinkConfig {
    /// Replaces the threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: Priority) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enables or disables the timestamp segment.
    #[must_use]
    pub const fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Enables or disables the priority segment.
    #[must_use]
    pub const fn with_priority_tags(mut self, enabled: bool) -> Self {
        self.priority_tags = enabled;
        self
    }

    /// Configuration producing bare message text, useful for tests and for
    /// sinks whose consumer adds its own framing.
    #[must_use]
    pub const fn plain(threshold: Priority) -> Self {
        Self {
            threshold,
            timestamps: false,
            priority_tags: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_emits_notice_with_both_segments() {
        let config = SinkConfig::default();
        assert_eq!(config.threshold, Priority::Notice);
        assert!(config.timestamps);
        assert!(config.priority_tags);
    }

    #[test]
    fn builders_replace_single_fields() {
        let config = SinkConfig::default()
            .with_threshold(Priority::Debug2)
            .with_timestamps(false);
        assert_eq!(config.threshold, Priority::Debug2);
        assert!(!config.timestamps);
        assert!(config.priority_tags);
    }

    #[test]
    fn plain_disables_both_segments() {
        let config = SinkConfig::plain(Priority::Error);
        let expected = SinkConfig::default()
            .with_threshold(Priority::Error)
            .with_timestamps(false)
            .with_priority_tags(false);
        assert_eq!(config, expected);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: SinkConfig = serde_json::from_str(r#"{"threshold":"WARN"}"#).unwrap();
        assert_eq!(config, SinkConfig::default().with_threshold(Priority::Warn));

        let json = serde_json::to_string(&SinkConfig::default()).unwrap();
        assert!(json.contains("\"NOTICE\""));
    }
}
