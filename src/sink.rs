//! Diagnostic Sink
//!
//! Destination for errors that have no caller to return to, such as a
//! failed background flush.

use std::io::Write;

use parking_lot::Mutex;

/// Accepts free-text error lines
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Default sink: forwards every line to `tracing::error!`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Writes each report as one line to the wrapped writer
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Run `f` with the inner writer locked
    pub fn with_writer<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        f(&self.writer.lock())
    }
}

impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
    fn report(&self, message: &str) {
        let mut writer = self.writer.lock();
        // Nowhere left to report a failing sink.
        let _ = writeln!(writer, "{}", message);
        let _ = writer.flush();
    }
}
