//! Output targets for transaction markers.
//!
//! Every sink writes one marker per call as a single newline-terminated
//! line. Writes happen under a lock so a line is never split, although lines
//! from concurrent callers may interleave.
//!
//! The process stream sinks go through `println!`/`eprintln!` so the test
//! harness captures their lines per test.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{MarkerError, MarkerResult};
use crate::transactions::Marker;

/// Destination for marker lines.
pub trait MarkerSink {
    /// Write `line` followed by a newline.
    fn write_line(&self, line: &str) -> io::Result<()>;

    fn write_marker(&self, marker: Marker) -> MarkerResult<()> {
        self.write_line(marker.as_str())
            .map_err(|source| MarkerError::sink_write(marker.as_str(), source))
    }
}

impl<S: MarkerSink + ?Sized> MarkerSink for &S {
    fn write_line(&self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

impl<S: MarkerSink + ?Sized> MarkerSink for Arc<S> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

impl<S: MarkerSink + ?Sized> MarkerSink for Box<S> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }
}

/// Process standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl MarkerSink for StdoutSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }
}

/// Process standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl MarkerSink for StderrSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        eprintln!("{line}");
        Ok(())
    }
}

/// Any [`Write`] target, guarded by a mutex.
#[derive(Debug, Default)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and hand back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> MarkerSink for WriterSink<W> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

/// In-memory line buffer for tests.
///
/// Clones share the same buffer, so a clone handed to a
/// [`TransactionMarker`](crate::TransactionMarker) can be inspected through
/// the original.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.buffer().clone()
    }

    /// Drain the buffer, returning its lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.buffer())
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MarkerSink for CaptureSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.buffer().push(line.to_string());
        Ok(())
    }
}
