//! Shared Test Helpers for Transaction Marker Fixtures
//!
//! Capture-backed markers, line assertions, and a `Result`-based assertion
//! style for tests that prefer `?` over panicking.

use crate::error::MarkerError;
use crate::sink::CaptureSink;
use crate::transactions::{Marker, TransactionMarker};

/// Install a fmt subscriber honouring `RUST_LOG`; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A marker writing into a fresh capture buffer, plus a handle on that buffer.
pub fn captured_marker() -> (TransactionMarker<CaptureSink>, CaptureSink) {
    let sink = CaptureSink::new();
    (TransactionMarker::new(sink.clone()), sink)
}

/// Check the captured lines against an exact marker sequence.
pub fn assert_markers(sink: &CaptureSink, expected: &[Marker]) -> TestResult {
    let expected: Vec<&str> = expected.iter().map(|m| m.as_str()).collect();
    crate::test_assert_eq!(
        sink.lines(),
        expected,
        "marker lines {:?} did not match {:?}",
        sink.lines(),
        expected
    );
    Ok(())
}

// =============================================================================
// UNIFIED TEST ERROR HANDLING
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TestError {
    #[error("Assertion failed: {message}")]
    AssertionFailure { message: String },

    #[error("Marker error: {source}")]
    MarkerError {
        #[from]
        source: MarkerError,
    },

    #[error("Fixture failure: {message}")]
    FixtureFailure { message: String },
}

impl TestError {
    pub fn assertion_failure(message: impl Into<String>) -> Self {
        Self::AssertionFailure {
            message: message.into(),
        }
    }

    /// An error for fixtures to fail with on purpose.
    pub fn fixture_failure(message: impl Into<String>) -> Self {
        Self::FixtureFailure {
            message: message.into(),
        }
    }
}

/// Alias for the standard test result type
pub type TestResult<T = ()> = Result<T, TestError>;

/// Helper macro for test assertions that return TestError instead of panicking
#[macro_export]
macro_rules! test_assert {
    ($condition:expr) => {
        if !($condition) {
            return Err($crate::test_helpers::TestError::assertion_failure(
                format!("assertion failed: {}", stringify!($condition))
            ));
        }
    };
    ($condition:expr, $message:expr $(, $arg:expr)*) => {
        if !($condition) {
            return Err($crate::test_helpers::TestError::assertion_failure(
                format!($message $(, $arg)*)
            ));
        }
    };
}

/// Helper macro for test assertions with equality
#[macro_export]
macro_rules! test_assert_eq {
    ($left:expr, $right:expr) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    return Err($crate::test_helpers::TestError::assertion_failure(
                        format!("assertion failed: `(left == right)`\n  left: `{:?}`,\n right: `{:?}`",
                                left_val, right_val)
                    ));
                }
            }
        }
    };
    ($left:expr, $right:expr, $message:expr $(, $arg:expr)*) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    return Err($crate::test_helpers::TestError::assertion_failure(
                        format!($message $(, $arg)*)
                    ));
                }
            }
        }
    };
}
