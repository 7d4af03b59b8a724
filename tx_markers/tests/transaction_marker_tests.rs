use mockall::{Sequence, mock};
use serial_test::serial;
use std::io;
use std::process::Command;
use std::sync::Arc;
use std::thread;
use tx_markers::test_helpers::{TestError, TestResult, assert_markers, captured_marker, init_test_tracing};
use tx_markers::{
    CaptureSink, Marker, MarkerConfig, MarkerSink, SinkTarget, TransactionMarker, WriterSink,
    atomic, atomic_fallible, cancel_transaction, end_transaction, start_transaction,
};

mock! {
    pub Sink {}

    impl MarkerSink for Sink {
        fn write_line(&self, line: &str) -> io::Result<()>;
    }
}

#[test]
fn test_wrapper_writes_begin_then_commit_in_order() {
    init_test_tracing();
    let mut sink = MockSink::new();
    let mut seq = Sequence::new();
    sink.expect_write_line()
        .withf(|line| line.to_string() == "BEGIN TRANSACTION;")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    sink.expect_write_line()
        .withf(|line| line.to_string() == "COMMIT TRANSACTION;")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let marker = TransactionMarker::new(&sink);
    let mut add = marker.wrap(|(x, y): (i32, i32)| x + y);

    assert_eq!(add((2, 3)), 5);
}

#[test]
fn test_sink_failure_does_not_fail_wrapped_call() {
    init_test_tracing();
    let mut sink = MockSink::new();
    sink.expect_write_line()
        .times(2)
        .returning(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")));

    let marker = TransactionMarker::new(&sink);
    let mut double = marker.wrap(|x: u64| x * 2);

    assert_eq!(double(21), 42);
}

#[test]
fn test_sink_failure_is_visible_through_write_marker() {
    let mut sink = MockSink::new();
    sink.expect_write_line()
        .returning(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")));

    let err = sink.write_marker(Marker::Rollback).unwrap_err();
    assert!(err.to_string().contains("ROLLBACK TRANSACTION;"));
}

#[test]
fn test_failing_fixture_propagates_identical_error() -> TestResult {
    let (marker, sink) = captured_marker();
    let mut fixture = marker.wrap_fallible(|()| -> TestResult<()> {
        Err(TestError::fixture_failure("seed data rejected"))
    });

    match fixture(()) {
        Err(TestError::FixtureFailure { message }) => assert_eq!(message, "seed data rejected"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_markers(&sink, &[Marker::Begin])
}

#[test]
fn test_caller_can_roll_back_after_failure() -> TestResult {
    let (marker, sink) = captured_marker();
    let mut fixture = marker.wrap_fallible(|id: i64| {
        if id < 0 {
            Err(format!("invalid id {id}"))
        } else {
            Ok(id)
        }
    });

    if fixture(-1).is_err() {
        marker.rollback();
    }
    assert_markers(&sink, &[Marker::Begin, Marker::Rollback])
}

#[test]
fn test_wrapped_state_is_not_shared_between_calls() -> TestResult {
    let (marker, sink) = captured_marker();
    let mut calls = 0;
    let mut count = marker.wrap(|()| {
        calls += 1;
        calls
    });

    assert_eq!(count(()), 1);
    assert_eq!(count(()), 2);
    drop(count);
    assert_eq!(calls, 2);
    assert_markers(&sink, &[Marker::Begin, Marker::Commit, Marker::Begin, Marker::Commit])
}

#[test]
fn test_writer_sink_receives_newline_terminated_lines() {
    let sink = Arc::new(WriterSink::new(Vec::new()));
    let marker = TransactionMarker::new(Arc::clone(&sink));
    marker.run(|| ());
    marker.rollback();
    drop(marker);

    let sink = Arc::try_unwrap(sink).expect("marker dropped its reference");
    assert_eq!(
        String::from_utf8(sink.into_inner()).unwrap(),
        "BEGIN TRANSACTION;\nCOMMIT TRANSACTION;\nROLLBACK TRANSACTION;\n"
    );
}

#[test]
fn test_concurrent_wrappers_write_whole_lines() {
    let sink = CaptureSink::new();
    let marker = TransactionMarker::new(sink.clone());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mut square = marker.wrap(|x: i32| x * x);
            thread::spawn(move || square(i))
        })
        .collect();
    let results: Vec<i32> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results, vec![0, 1, 4, 9]);
    let lines = sink.lines();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines.iter().filter(|l| *l == "BEGIN TRANSACTION;").count(), 4);
    assert_eq!(lines.iter().filter(|l| *l == "COMMIT TRANSACTION;").count(), 4);
}

#[test]
fn test_marker_from_config_wraps_calls() {
    let config = MarkerConfig::from_yaml_str("sink: stderr\n").unwrap();
    assert_eq!(config.sink, SinkTarget::Stderr);

    let marker = TransactionMarker::from_config(&config);
    let mut concat = marker.wrap(|(a, b): (&str, &str)| format!("{a}{b}"));
    assert_eq!(concat(("tx", "42")), "tx42");
}

const STDOUT_CHILD_ENV: &str = "TX_MARKERS_STDOUT_CHILD";
const STDOUT_CHILD_TEST: &str = "stdout_markers_child";

// Runs only when spawned by the stdout tests below.
#[test]
fn stdout_markers_child() {
    if std::env::var_os(STDOUT_CHILD_ENV).is_none() {
        return;
    }

    let mut add = atomic(|(x, y): (i32, i32)| x + y);
    assert_eq!(add((2, 3)), 5);

    let mut fail = atomic_fallible(|()| Err::<(), _>("boom"));
    assert_eq!(fail(()), Err("boom"));

    let () = cancel_transaction();
}

fn run_stdout_child(nocapture: bool) -> Vec<String> {
    let exe = std::env::current_exe().expect("test binary path");
    let mut command = Command::new(exe);
    command
        .args([STDOUT_CHILD_TEST, "--exact", "--test-threads=1"])
        .env(STDOUT_CHILD_ENV, "1");
    if nocapture {
        command.arg("--nocapture");
    }

    let output = command.output().expect("spawn test binary");
    assert!(output.status.success(), "child test failed: {output:?}");

    // libtest may print "test <name> ... " on the same line as the first marker.
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.rsplit("... ").next().unwrap_or(line).trim().to_string())
        .filter(|line| line.ends_with("TRANSACTION;"))
        .collect()
}

#[test]
#[serial]
fn test_stdout_helpers_print_exact_markers() {
    let lines = run_stdout_child(true);

    assert_eq!(
        lines,
        vec![
            "BEGIN TRANSACTION;",
            "COMMIT TRANSACTION;",
            "BEGIN TRANSACTION;",
            "ROLLBACK TRANSACTION;",
        ]
    );
    assert_eq!(lines.iter().filter(|l| *l == "ROLLBACK TRANSACTION;").count(), 1);
}

#[test]
#[serial]
fn test_stdout_markers_are_captured_for_passing_tests() {
    assert!(run_stdout_child(false).is_empty());
}

#[test]
#[serial]
fn test_stdout_notifiers_return_unit() {
    start_transaction();
    end_transaction();
    let () = cancel_transaction();
}
