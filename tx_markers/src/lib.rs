//! Placeholder SQL transaction markers for test fixtures
//!
//! This crate brackets calls with `BEGIN TRANSACTION;` / `COMMIT TRANSACTION;`
//! lines and offers a standalone `ROLLBACK TRANSACTION;` notifier:
//!
//! - Generic wrappers over any callable, infallible or `Result`-returning
//! - Injectable output sinks (stdout, stderr, any writer, in-memory capture)
//! - YAML configuration for picking the sink
//!
//! No database is involved and no transactional guarantee is given.

pub mod config;
pub mod error;
pub mod sink;
pub mod transactions;

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::{MarkerConfig, SinkTarget};
pub use error::{MarkerError, MarkerResult};
pub use sink::{CaptureSink, MarkerSink, StderrSink, StdoutSink, WriterSink};
pub use transactions::{
    DynSink, Marker, TransactionMarker, atomic, atomic_fallible, cancel_transaction,
    end_transaction, start_transaction,
};

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{
    TestError, TestResult, assert_markers, captured_marker, init_test_tracing,
};
