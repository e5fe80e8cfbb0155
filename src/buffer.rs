//! Write Buffer Module
//!
//! In-memory accumulation of records that have not reached disk yet, and
//! the flush policy deciding when they do.
//!
//! ## Write Path
//! ```text
//! write(data)
//!   │
//!   ├─ buffer ← data + '\n'          pending += 1, logical size += len + 1
//!   ├─ pending ≥ auto_flush_count?   → flush
//!   └─ logical size ≥ max size?      → flush, rotate
//! ```

use std::time::Duration;

use bytes::BytesMut;

use crate::error::{AtlasError, Result};
use crate::segment::{SegmentWriter, DELIMITER};

/// Records buffered since the last flush
#[derive(Debug, Default)]
pub struct WriteBuffer {
    /// Delimited record bytes, ready to be written in one call
    buf: BytesMut,
    /// Number of records in `buf`
    pending: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record and its delimiter; returns the bytes added
    pub fn push(&mut self, data: &[u8]) -> u64 {
        self.buf.reserve(data.len() + 1);
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(&[DELIMITER]);
        self.pending += 1;
        data.len() as u64 + 1
    }

    /// Number of buffered records
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.pending = 0;
    }
}

/// Everything the write lock guards
pub struct WriteState {
    /// Current segment and rotation bookkeeping
    segments: SegmentWriter,
    /// Pending records
    buffer: WriteBuffer,
    /// Flush after N buffered records, 0 disables
    auto_flush_count: usize,
    /// Period of the background flush, once set
    auto_flush_time: Option<Duration>,
    /// fsync after each flush
    sync_on_flush: bool,
}

impl WriteState {
    pub fn new(segments: SegmentWriter, auto_flush_count: usize, sync_on_flush: bool) -> Self {
        Self {
            segments,
            buffer: WriteBuffer::new(),
            auto_flush_count,
            auto_flush_time: None,
            sync_on_flush,
        }
    }

    /// Buffer one record, then apply the count and size triggers
    ///
    /// The record stays buffered even when a triggered flush or rotation
    /// fails; the first such error is returned.
    pub fn write(&mut self, data: &[u8]) -> Result<u64> {
        let written = self.buffer.push(data);
        self.segments.add_logical_size(written);

        if self.auto_flush_count > 0 && self.buffer.pending() >= self.auto_flush_count {
            self.flush()?;
        }

        if self.segments.needs_rotation() {
            self.flush()?;
            self.segments
                .rotate()
                .map_err(|e| AtlasError::Rotate(Box::new(e)))?;
        }

        Ok(written)
    }

    /// Write all buffered records to the current segment in one call
    ///
    /// Returns the number of records flushed, 0 when nothing was pending.
    /// When the write fails the buffer is kept so a retry writes the same
    /// bytes. When only the sync fails the records are already in the
    /// segment and `FlushSync` carries their count.
    pub fn flush(&mut self) -> Result<usize> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        self.segments
            .append(self.buffer.as_bytes())
            .map_err(AtlasError::Flush)?;

        let count = self.buffer.pending();
        self.buffer.clear();

        if self.sync_on_flush {
            self.segments
                .sync()
                .map_err(|source| AtlasError::FlushSync {
                    flushed: count,
                    source,
                })?;
        }

        Ok(count)
    }

    pub fn set_auto_flush_count(&mut self, count: usize) {
        self.auto_flush_count = count;
    }

    pub fn auto_flush_count(&self) -> usize {
        self.auto_flush_count
    }

    /// Whether `period` would be accepted, without recording it
    pub fn check_auto_flush_time(&self, period: Duration) -> Result<()> {
        if self.auto_flush_time.is_some() {
            return Err(AtlasError::AutoFlushTimeAlreadySet);
        }
        if period.is_zero() {
            return Err(AtlasError::InvalidAutoFlushPeriod);
        }
        Ok(())
    }

    /// Record the background flush period; it can be set only once
    pub fn set_auto_flush_time(&mut self, period: Duration) -> Result<()> {
        self.check_auto_flush_time(period)?;
        self.auto_flush_time = Some(period);
        Ok(())
    }

    pub fn auto_flush_time(&self) -> Option<Duration> {
        self.auto_flush_time
    }

    pub fn set_max_size(&mut self, size: u64) {
        self.segments.set_max_size(size);
    }

    pub fn pending(&self) -> usize {
        self.buffer.pending()
    }

    pub fn segments(&self) -> &SegmentWriter {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut SegmentWriter {
        &mut self.segments
    }
}
