//! Tests for message assembly and termination.

use std::fmt;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use logging::SinkConfig;
use test_support::{FailingWriter, SharedBuffer};

use super::*;

fn plain_sink(threshold: Priority) -> (LogSink, SharedBuffer) {
    let output = SharedBuffer::new();
    let sink = LogSink::with_config(output.clone(), SinkConfig::plain(threshold));
    (sink, output)
}

// ============================================================================
// Assembly
// ============================================================================

/// Verifies fragments of different types join into one line.
#[test]
fn fragments_join_into_one_line() {
    let (sink, output) = plain_sink(Priority::Notice);
    let handle = LogHandle::new(&sink);

    handle
        .append("sent ")
        .append(42u64)
        .append(" bytes in ")
        .append(1.5)
        .append('s');
    assert_eq!(handle.pending(), "sent 42 bytes in 1.5s");
    assert!(handle.end().unwrap());

    assert_eq!(output.text(), "sent 42 bytes in 1.5s\n");
    assert!(handle.pending().is_empty());
}

/// Verifies an empty message still produces one terminated line.
#[test]
fn empty_message_emits_bare_newline() {
    let (sink, output) = plain_sink(Priority::Notice);
    let handle = LogHandle::new(&sink);

    assert!(handle.end().unwrap());
    assert_eq!(output.contents(), b"\n");
}

struct Nested<'h, 'a>(&'h LogHandle<'a>);

impl fmt::Display for Nested<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.append("inner ");
        f.write_str("outer")
    }
}

/// Verifies a fragment whose rendering appends to the same handle does not
/// deadlock.
#[test]
fn nested_append_from_display_does_not_deadlock() {
    let (sink, output) = plain_sink(Priority::Notice);
    let handle = LogHandle::new(&sink);

    handle.append(Nested(&handle));
    handle.end().unwrap();

    assert_eq!(output.text(), "inner outer\n");
}

// ============================================================================
// Priority and gating
// ============================================================================

/// Verifies an overridden priority reverts to the default after the
/// terminator.
#[test]
fn priority_override_reverts_after_end() {
    let output = SharedBuffer::new();
    let config = SinkConfig::default().with_timestamps(false);
    let sink = LogSink::with_config(output.clone(), config);
    let handle = LogHandle::with_priority(&sink, Priority::Warn);

    handle.set_priority(Priority::Fatal).append("boom");
    assert_eq!(handle.priority(), Priority::Fatal);
    handle.end().unwrap();
    assert_eq!(handle.priority(), Priority::Warn);

    handle.append("careful").end().unwrap();
    assert_eq!(output.lines(), ["[FATAL] boom", "[WARN] careful"]);
}

/// Verifies a gated message produces no output but clears the handle.
#[test]
fn gated_message_is_discarded() {
    let (sink, output) = plain_sink(Priority::Warn);
    let handle = LogHandle::new(&sink);

    handle.set_priority(Priority::Debug).append("noise").pin_timestamp();
    assert!(!handle.end().unwrap());

    assert!(output.contents().is_empty());
    assert!(handle.pending().is_empty());
    assert_eq!(handle.priority(), Priority::Notice);
    assert!(handle.pinned().is_none());
}

/// Verifies emission across the whole scale for one threshold.
#[test]
fn output_matches_gate_for_every_priority() {
    let (sink, output) = plain_sink(Priority::Error);
    let handle = LogHandle::new(&sink);

    for priority in Priority::ALL {
        handle.log(priority, priority.name()).unwrap();
    }

    assert_eq!(output.lines(), ["CATASTROPHIC", "FATAL", "CRITICAL", "ERROR"]);
}

// ============================================================================
// Timestamps
// ============================================================================

/// Verifies a pinned timestamp is used instead of the terminator's time.
#[test]
fn pinned_timestamp_is_emitted() {
    let output = SharedBuffer::new();
    let config = SinkConfig::default().with_priority_tags(false);
    let sink = LogSink::with_config(output.clone(), config);
    let handle = LogHandle::new(&sink);

    handle.pin_timestamp().append("pinned");
    let pinned = handle.pinned().unwrap();
    thread::sleep(Duration::from_millis(25));
    handle.end().unwrap();

    assert_eq!(output.text(), format!("[{pinned}] pinned\n"));
    assert!(handle.pinned().is_none());
}

/// Verifies the pin only applies to the next line.
#[test]
fn pin_is_single_shot() {
    let output = SharedBuffer::new();
    let config = SinkConfig::default().with_priority_tags(false);
    let sink = LogSink::with_config(output.clone(), config);
    let handle = LogHandle::new(&sink);

    handle.pin_timestamp();
    let pinned = handle.pinned().unwrap();
    handle.append("first").end().unwrap();
    thread::sleep(Duration::from_millis(25));
    handle.append("second").end().unwrap();

    let lines = output.lines();
    assert_eq!(lines[0], format!("[{pinned}] first"));
    assert_ne!(lines[1], format!("[{pinned}] second"));
}

// ============================================================================
// Closed sinks and failures
// ============================================================================

/// Verifies terminating against a closed sink keeps the message for later.
#[test]
fn closed_sink_leaves_message_intact() {
    let sink = LogSink::unbound(SinkConfig::plain(Priority::Notice));
    let handle = LogHandle::new(&sink);

    handle.set_priority(Priority::Error).append("queued");
    assert!(!handle.end().unwrap());
    assert_eq!(handle.pending(), "queued");
    assert_eq!(handle.priority(), Priority::Error);

    let output = SharedBuffer::new();
    sink.bind(output.clone());
    assert!(handle.end().unwrap());
    assert_eq!(output.text(), "queued\n");
}

/// Verifies a write failure surfaces as an I/O error and resets the handle.
#[test]
fn write_failure_resets_handle() {
    let sink = LogSink::with_config(FailingWriter, SinkConfig::plain(Priority::Notice));
    let handle = LogHandle::new(&sink);

    handle.append("lost");
    assert!(matches!(handle.end(), Err(LogError::Io(_))));
    assert!(handle.pending().is_empty());
}

// ============================================================================
// Concurrency
// ============================================================================

/// Verifies two threads emitting through separate handles produce exactly
/// 2000 intact lines.
#[test]
fn two_threads_thousand_lines_each() {
    let output = SharedBuffer::new();
    let sink = LogSink::new(output.clone());

    thread::scope(|scope| {
        for worker in 0..2 {
            let sink = &sink;
            scope.spawn(move || {
                let handle = LogHandle::new(sink);
                for line in 0..1000 {
                    handle.append("worker ").append(worker).append(" line ").append(line);
                    assert!(handle.end().unwrap());
                }
            });
        }
    });

    let text = output.text();
    assert_eq!(text.matches('\n').count(), 2000);
    assert!(text.ends_with('\n'));
    for worker in 0..2 {
        let prefix = format!("worker {worker} ");
        let expected: Vec<String> = (0..1000)
            .map(|line| format!("worker {worker} line {line}"))
            .collect();
        let actual: Vec<String> = text
            .lines()
            .filter_map(|line| line.split_once("] [NOTICE] ").map(|(_, message)| message.to_owned()))
            .filter(|message| message.starts_with(prefix.as_str()))
            .collect();
        assert_eq!(actual, expected);
    }
}

/// Verifies holding a shared handle keeps a multi-fragment message
/// contiguous while another thread uses the same handle.
#[test]
fn held_handle_keeps_fragments_contiguous() {
    let (sink, output) = plain_sink(Priority::Notice);
    let handle = LogHandle::new(&sink);

    thread::scope(|scope| {
        for worker in ['a', 'b'] {
            let handle = &handle;
            scope.spawn(move || {
                for _ in 0..200 {
                    let _held = handle.hold();
                    for _ in 0..5 {
                        handle.append(worker);
                    }
                    handle.end().unwrap();
                }
            });
        }
    });

    let lines = output.lines();
    assert_eq!(lines.len(), 400);
    assert!(lines.iter().all(|line| line == "aaaaa" || line == "bbbbb"));
}

/// Verifies a second thread cannot splice its message into one another
/// thread has started on the same handle.
#[test]
fn started_message_excludes_other_threads_until_end() {
    let (sink, output) = plain_sink(Priority::Notice);
    let handle = LogHandle::new(&sink);
    let (started_tx, started_rx) = mpsc::channel();

    thread::scope(|scope| {
        let first = &handle;
        scope.spawn(move || {
            first.append("A-start ");
            started_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(50));
            first.append("A-end");
            first.end().unwrap();
        });

        let second = &handle;
        scope.spawn(move || {
            started_rx.recv().unwrap();
            second.append("B-line");
            second.end().unwrap();
        });
    });

    assert_eq!(output.lines(), ["A-start A-end", "B-line"]);
}

/// Verifies setting a priority alone also claims the message for the
/// calling thread.
#[test]
fn set_priority_claims_the_message() {
    let output = SharedBuffer::new();
    let config = SinkConfig::default().with_timestamps(false);
    let sink = LogSink::with_config(output.clone(), config);
    let handle = LogHandle::new(&sink);
    let (started_tx, started_rx) = mpsc::channel();

    thread::scope(|scope| {
        let first = &handle;
        scope.spawn(move || {
            first.set_priority(Priority::Error);
            started_tx.send(()).unwrap();
            thread::sleep(Duration::from_millis(50));
            first.append("mine").end().unwrap();
        });

        let second = &handle;
        scope.spawn(move || {
            started_rx.recv().unwrap();
            second.append("theirs").end().unwrap();
        });
    });

    assert_eq!(output.lines(), ["[ERROR] mine", "[NOTICE] theirs"]);
}

/// Verifies a terminator against a closed sink still lets other threads use
/// the handle.
#[test]
fn closed_sink_terminator_releases_handle() {
    let sink = LogSink::unbound(SinkConfig::plain(Priority::Notice));
    let handle = LogHandle::new(&sink);

    handle.append("kept ");
    assert!(!handle.end().unwrap());

    let output = SharedBuffer::new();
    sink.bind(output.clone());
    thread::scope(|scope| {
        let handle = &handle;
        scope.spawn(move || {
            handle.append("and finished");
            assert!(handle.end().unwrap());
        });
    });

    assert_eq!(output.text(), "kept and finished\n");
}
