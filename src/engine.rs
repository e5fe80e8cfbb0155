//! Engine Module
//!
//! The event storage facade that coordinates all components.
//!
//! ## Responsibilities
//! - Recover the segment set from the registry on startup
//! - Route writes through the buffer, flush policy and rotation
//! - Serve paginated reads from flushed segments
//! - Own the background flush thread and shut everything down

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::buffer::WriteState;
use crate::config::Config;
use crate::error::{AtlasError, Result};
use crate::flusher::AutoFlusher;
use crate::segment::{Registry, SegmentReader, SegmentWriter};
use crate::sink::{DiagnosticSink, TracingSink};

/// Append-only event storage over a directory of segments
///
/// ## Concurrency Model: two independent locks
///
/// - **Write lock** (`write`): buffer, pending count, write segment, logical
///   size, flush settings. Taken by `write`, `flush`, rotation and the
///   background flush thread.
/// - **Read lock** (`read`): read handles and scan scratch state. Serializes
///   `read` calls.
///
/// The two are never held together, so readers and writers do not block
/// each other. A record becomes visible to `read` only once flushed.
/// Segments created by rotation reach the read side through a channel that
/// is filled under the write lock and drained under the read lock.
pub struct EventStorage {
    /// Storage configuration
    config: Config,

    /// Write side (shared with the auto-flush thread)
    write: Arc<Mutex<WriteState>>,

    /// Read side
    read: Mutex<SegmentReader>,

    /// Background flush thread, once started
    flusher: Mutex<Option<AutoFlusher>>,

    /// Where background failures are reported
    sink: Arc<dyn DiagnosticSink>,

    /// Set by shutdown
    closed: AtomicBool,
}

impl EventStorage {
    /// Open or create storage with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Open the registry and load its segment names
    /// 3. Open every registered segment for read
    /// 4. Reopen the last segment for append, or create segment 1
    /// 5. Start the auto-flush thread if configured
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_sink(config, Arc::new(TracingSink))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Open, reporting background failures to `sink`
    pub fn open_with_sink(config: Config, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        config.validate()?;

        let dir = config.data_dir.as_path();
        fs::create_dir_all(dir)?;

        let registry = Registry::open(dir)?;
        let mut reader = SegmentReader::load(dir, registry.entries(), config.read_chunk_size)?;

        let segments = SegmentWriter::open(dir, registry, config.segment_max_size)?;
        reader.attach(segments.published());

        tracing::info!(
            "Opened event storage at {} ({} segment(s), current {} at {} bytes)",
            dir.display(),
            reader.len(),
            segments.current(),
            segments.logical_size()
        );

        let state = WriteState::new(segments, config.auto_flush_count, config.sync_on_flush);
        let interval = config.auto_flush_interval;

        let storage = Self {
            config,
            write: Arc::new(Mutex::new(state)),
            read: Mutex::new(reader),
            flusher: Mutex::new(None),
            sink,
            closed: AtomicBool::new(false),
        };

        if let Some(period) = interval {
            storage.set_auto_flush_time(period)?;
        }

        Ok(storage)
    }

    /// Append one record
    ///
    /// The record is buffered with a trailing `\n` and returns the number of
    /// bytes it occupies. It must not contain `\n` itself: an embedded
    /// delimiter is not escaped and reads back as two records.
    ///
    /// Steps (all under the write lock):
    /// 1. Buffer the record
    /// 2. Flush if the auto-flush count is reached
    /// 3. Flush and rotate if the segment size threshold is reached
    pub fn write(&self, data: &[u8]) -> Result<u64> {
        let mut state = self.write.lock();
        // Shutdown marks the storage closed before taking this lock.
        self.ensure_open()?;
        state.write(data)
    }

    /// Flush buffered records to the current segment
    ///
    /// Returns how many records were written; 0 when nothing was pending.
    pub fn flush(&self) -> Result<usize> {
        let mut state = self.write.lock();
        self.ensure_open()?;
        state.flush()
    }

    /// Read up to `count` flushed records, skipping the first `offset`
    ///
    /// Returns fewer than `count` records when the log runs out.
    pub fn read(&self, count: usize, offset: usize) -> Vec<Vec<u8>> {
        self.read.lock().scan(count, offset as u64)
    }

    /// Raw bytes from one segment, starting at byte `offset`
    ///
    /// The result is shorter than `len` when the segment ends first.
    pub fn read_bytes(&self, segment: u64, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let read = self.read.lock().read_at(segment, offset, &mut buf)?;
        buf.truncate(read);
        Ok(buf)
    }

    /// Flush after every `count` buffered records, 0 disables
    pub fn set_auto_flush_count(&self, count: usize) {
        self.write.lock().set_auto_flush_count(count);
    }

    pub fn auto_flush_count(&self) -> usize {
        self.write.lock().auto_flush_count()
    }

    /// Start flushing every `period` from a background thread
    ///
    /// Can be set once per instance; reopen the storage to change it. The
    /// period is recorded only once the thread is running.
    pub fn set_auto_flush_time(&self, period: Duration) -> Result<()> {
        let mut slot = self.flusher.lock();
        self.ensure_open()?;

        self.write.lock().check_auto_flush_time(period)?;

        let flusher = AutoFlusher::start(period, Arc::clone(&self.write), Arc::clone(&self.sink))?;
        self.write.lock().set_auto_flush_time(period)?;
        *slot = Some(flusher);
        Ok(())
    }

    pub fn auto_flush_time(&self) -> Option<Duration> {
        self.write.lock().auto_flush_time()
    }

    /// Set the rotation threshold (in bytes)
    pub fn set_write_file_max_size(&self, size: u64) {
        self.write.lock().set_max_size(size);
    }

    /// Stop the flush thread and close every file
    ///
    /// Still-buffered records are flushed first; failures go to the sink.
    /// Later calls do nothing.
    pub fn shutdown(&self) {
        let flusher = {
            let mut slot = self.flusher.lock();
            if self.closed.swap(true, Ordering::SeqCst) {
                return;
            }
            slot.take()
        };

        if let Some(mut flusher) = flusher {
            flusher.stop();
        }

        {
            let mut state = self.write.lock();
            if let Err(e) = state.flush() {
                self.sink.report(&format!("shutdown flush failed: {}", e));
            }
            if let Err(e) = state.segments_mut().close() {
                self.sink.report(&format!("shutdown close failed: {}", e));
            }
        }

        self.read.lock().close();

        tracing::info!("Event storage at {} shut down", self.config.data_dir.display());
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Number of segments open for read
    pub fn segment_count(&self) -> usize {
        let mut reader = self.read.lock();
        reader.receive_published();
        reader.len()
    }

    /// Segment names recorded in the registry, in order
    pub fn registry_entries(&self) -> Vec<String> {
        self.write.lock().segments().registry().entries().to_vec()
    }

    /// Number of the segment currently written to
    pub fn current_segment(&self) -> u64 {
        self.write.lock().segments().current()
    }

    /// Logical size of the current segment, unflushed bytes included
    pub fn current_segment_size(&self) -> u64 {
        self.write.lock().segments().logical_size()
    }

    /// Records buffered but not yet flushed
    pub fn pending_count(&self) -> usize {
        self.write.lock().pending()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(AtlasError::Closed);
        }
        Ok(())
    }
}

impl Drop for EventStorage {
    fn drop(&mut self) {
        self.shutdown();
    }
}
