//! Gate rule behavior across the whole priority scale.

use logging::{Priority, SinkConfig};

/// Verifies every threshold admits exactly the priorities at or above its
/// severity.
#[test]
fn each_threshold_admits_its_prefix_of_the_scale() {
    for threshold in Priority::ALL {
        let admitted: Vec<Priority> = Priority::ALL
            .into_iter()
            .filter(|priority| priority.passes(threshold))
            .collect();
        assert_eq!(admitted.len(), usize::from(threshold.ordinal()) + 1);
        assert_eq!(admitted.last(), Some(&threshold));
    }
}

/// Verifies a threshold read from text configures the sink gate.
#[test]
fn threshold_parsed_from_text() {
    let threshold: Priority = "CRITICAL".parse().unwrap();
    let config = SinkConfig::default().with_threshold(threshold);

    assert!(Priority::Fatal.passes(config.threshold));
    assert!(Priority::Critical.passes(config.threshold));
    assert!(!Priority::Error.passes(config.threshold));
}

/// Verifies the most permissive threshold lets every priority through.
#[test]
fn loudest_threshold_admits_everything() {
    let config = SinkConfig::default().with_threshold(Priority::EvenLoggingTheLogging);
    assert!(Priority::ALL.iter().all(|priority| priority.passes(config.threshold)));
}

/// Verifies unknown names surface a configuration error.
#[test]
fn unknown_name_is_configuration_error() {
    let err = "VERBOSE".parse::<Priority>().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("VERBOSE"));
}
