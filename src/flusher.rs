//! Background Auto-flush
//!
//! One thread flushing the write buffer every period until stopped.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, select, Sender};
use parking_lot::Mutex;

use crate::buffer::WriteState;
use crate::error::{AtlasError, Result};
use crate::sink::DiagnosticSink;

/// Handle to the running flush thread
///
/// The stop channel is checked on every tick, so `stop` returns only after
/// the thread has exited and no further flush can run.
pub struct AutoFlusher {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AutoFlusher {
    /// Spawn the flush thread
    pub fn start(
        period: Duration,
        state: Arc<Mutex<WriteState>>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        if period.is_zero() {
            return Err(AtlasError::InvalidAutoFlushPeriod);
        }

        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let ticker = channel::tick(period);

        let handle = thread::Builder::new()
            .name("atlaslog-flush".to_string())
            .spawn(move || loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        let result = state.lock().flush();
                        // Failures here have no caller; the timer keeps going.
                        if let Err(e) = result {
                            sink.report(&format!("time flush failed: {}", e));
                        }
                    }
                }
            })?;

        tracing::debug!("Auto flush started, period {:?}", period);

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit. Safe to call twice.
    pub fn stop(&mut self) {
        // Dropping the sender also disconnects the channel.
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Auto flush thread panicked");
            }
            tracing::debug!("Auto flush stopped");
        }
    }
}

impl Drop for AutoFlusher {
    fn drop(&mut self) {
        self.stop();
    }
}
