//! Placeholder transaction bracketing for test fixtures.
//!
//! Nothing here talks to a database. A wrapped call is surrounded by
//! `BEGIN TRANSACTION;` and `COMMIT TRANSACTION;` lines so test output can be
//! grepped for transaction boundaries. A failing call leaves only the begin
//! line behind; no rollback line is written on its behalf.

use std::fmt;
use std::sync::Arc;

use crate::config::MarkerConfig;
use crate::sink::{MarkerSink, StdoutSink};

/// A fixed transaction boundary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Begin,
    Commit,
    Rollback,
}

impl Marker {
    /// The literal line, without its trailing newline.
    pub const fn as_str(self) -> &'static str {
        match self {
            Marker::Begin => "BEGIN TRANSACTION;",
            Marker::Commit => "COMMIT TRANSACTION;",
            Marker::Rollback => "ROLLBACK TRANSACTION;",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared sink used when the target is picked at runtime.
pub type DynSink = Arc<dyn MarkerSink + Send + Sync>;

/// Emits transaction markers to a sink and wraps callables with them.
#[derive(Debug, Clone, Default)]
pub struct TransactionMarker<S = StdoutSink> {
    sink: S,
}

impl TransactionMarker<StdoutSink> {
    pub fn stdout() -> Self {
        Self::new(StdoutSink)
    }
}

impl TransactionMarker<DynSink> {
    pub fn from_config(config: &MarkerConfig) -> Self {
        Self::new(config.sink.open())
    }
}

impl<S: MarkerSink> TransactionMarker<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn begin(&self) {
        self.emit(Marker::Begin);
    }

    pub fn commit(&self) {
        self.emit(Marker::Commit);
    }

    /// Standalone notifier; the wrappers never call it.
    pub fn rollback(&self) {
        self.emit(Marker::Rollback);
    }

    // Sink failures are logged and swallowed so they never fail the wrapped call.
    fn emit(&self, marker: Marker) {
        match self.sink.write_marker(marker) {
            Ok(()) => tracing::trace!(marker = %marker, "Emitted transaction marker"),
            Err(e) => tracing::warn!(error = %e, "Failed to emit transaction marker"),
        }
    }

    /// Bracket a single call of `f`.
    ///
    /// If `f` panics the commit line is skipped and the panic keeps unwinding.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        self.begin();
        let result = f();
        self.commit();
        result
    }

    /// Bracket a single call of a fallible `f`, committing only on `Ok`.
    pub fn run_fallible<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.begin();
        let value = f()?;
        self.commit();
        Ok(value)
    }
}

impl<S: MarkerSink + Clone> TransactionMarker<S> {
    /// Wrap `f` so every call is bracketed by begin and commit markers.
    ///
    /// Several arguments travel as a tuple:
    ///
    /// ```
    /// use tx_markers::{CaptureSink, TransactionMarker};
    ///
    /// let sink = CaptureSink::new();
    /// let mut add = TransactionMarker::new(sink.clone()).wrap(|(x, y): (i32, i32)| x + y);
    ///
    /// assert_eq!(add((2, 3)), 5);
    /// assert_eq!(sink.lines(), vec!["BEGIN TRANSACTION;", "COMMIT TRANSACTION;"]);
    /// ```
    pub fn wrap<F, A, R>(&self, mut f: F) -> impl FnMut(A) -> R + use<F, A, R, S>
    where
        F: FnMut(A) -> R,
    {
        let marker = self.clone();
        move |args| marker.run(|| f(args))
    }

    /// Like [`wrap`](Self::wrap), but an `Err` from `f` is returned as-is
    /// without a commit line.
    pub fn wrap_fallible<F, A, T, E>(
        &self,
        mut f: F,
    ) -> impl FnMut(A) -> Result<T, E> + use<F, A, T, E, S>
    where
        F: FnMut(A) -> Result<T, E>,
    {
        let marker = self.clone();
        move |args| marker.run_fallible(|| f(args))
    }
}

/// Wrap `f` with markers written to stdout.
pub fn atomic<F, A, R>(f: F) -> impl FnMut(A) -> R
where
    F: FnMut(A) -> R,
{
    TransactionMarker::stdout().wrap(f)
}

/// Wrap a fallible `f` with markers written to stdout.
pub fn atomic_fallible<F, A, T, E>(f: F) -> impl FnMut(A) -> Result<T, E>
where
    F: FnMut(A) -> Result<T, E>,
{
    TransactionMarker::stdout().wrap_fallible(f)
}

pub fn start_transaction() {
    TransactionMarker::stdout().begin();
}

pub fn end_transaction() {
    TransactionMarker::stdout().commit();
}

pub fn cancel_transaction() {
    TransactionMarker::stdout().rollback();
}
