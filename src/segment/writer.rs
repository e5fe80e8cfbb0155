//! Segment Writer
//!
//! Owns the segment currently open for appending and rotates it on size.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{AtlasError, Result};

use super::{segment_file_name, segment_path, Registry};

/// Write side of the segment set
///
/// ## States
/// - **active**: `file` is Some, appends go to segment `current`
/// - **no write segment**: `file` is None (shut down, or a rotation failed
///   to open its new segment). Appends fail until the storage is reopened.
///
/// Every created segment's read handle is sent on the hand-off channel
/// before the call that created it returns, so it is queued for readers
/// before any record can be flushed into it.
pub struct SegmentWriter {
    /// Directory holding the segments
    dir: PathBuf,
    /// Registry, extended once per created segment
    registry: Registry,
    /// Append handle of the current segment
    file: Option<File>,
    /// Number of the current (highest) segment
    current: u64,
    /// Logical size of the current segment, including unflushed bytes
    logical_size: u64,
    /// Rotation threshold in bytes
    max_size: u64,
    /// Hand-off of read handles for newly created segments
    opened_tx: Sender<(u64, File)>,
    opened_rx: Receiver<(u64, File)>,
}

impl SegmentWriter {
    /// Initialize the write segment from a loaded registry
    ///
    /// - Empty registry: create segment 1 and register it
    /// - Otherwise: reopen the last registered segment for appending and
    ///   seed the logical size from its on-disk size
    pub fn open(dir: &Path, registry: Registry, max_size: u64) -> Result<Self> {
        if !registry.is_open() {
            return Err(AtlasError::SegmentInit(
                "Cannot init write segment without registry".to_string(),
            ));
        }

        let (opened_tx, opened_rx) = channel::unbounded();
        let mut writer = Self {
            dir: dir.to_path_buf(),
            registry,
            file: None,
            current: 0,
            logical_size: 0,
            max_size,
            opened_tx,
            opened_rx,
        };

        if writer.registry.is_empty() {
            writer.create_segment(1).map_err(|e| {
                AtlasError::SegmentInit(format!("Failed to create first segment: {}", e))
            })?;
        } else {
            let number = writer.registry.len() as u64;
            let file = Self::open_for_append(&writer.dir, number).map_err(|e| {
                AtlasError::SegmentInit(format!("Failed to reopen segment {}: {}", number, e))
            })?;
            writer.file = Some(file);
            writer.current = number;
            writer.logical_size = writer.current_size()?;

            tracing::debug!(
                "Reopened segment {} for append ({} bytes)",
                number,
                writer.logical_size
            );
        }

        Ok(writer)
    }

    /// Append raw bytes to the current segment
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no active write segment")
        })?;
        file.write_all(bytes)
    }

    /// fsync the current segment's data
    pub fn sync(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.sync_data(),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "no active write segment",
            )),
        }
    }

    /// Close the current segment and continue in a new one
    ///
    /// A failed close does not stop the rotation: the new segment is still
    /// created and adopted, then the close failure is returned. A failed
    /// open leaves the writer with no write segment.
    pub fn rotate(&mut self) -> Result<()> {
        let previous = self.current;

        let close_result = match self.file.take() {
            Some(file) => file.sync_all().map_err(|source| AtlasError::SegmentClose {
                number: previous,
                source,
            }),
            None => Ok(()),
        };

        self.create_segment(previous + 1)?;
        tracing::debug!("Rotated segment {} -> {}", previous, self.current);

        close_result
    }

    /// On-disk size of the current segment, from file metadata
    pub fn current_size(&self) -> Result<u64> {
        match &self.file {
            Some(file) => Ok(file.metadata()?.len()),
            None => Err(AtlasError::SegmentInit(
                "No active write segment".to_string(),
            )),
        }
    }

    /// Account for bytes appended to the write buffer
    pub fn add_logical_size(&mut self, bytes: u64) {
        self.logical_size += bytes;
    }

    /// Logical size of the current segment including unflushed bytes
    pub fn logical_size(&self) -> u64 {
        self.logical_size
    }

    /// Whether the logical size has reached the rotation threshold
    pub fn needs_rotation(&self) -> bool {
        self.logical_size >= self.max_size
    }

    pub fn set_max_size(&mut self, size: u64) {
        self.max_size = size;
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Number of the current write segment
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.file.is_some()
    }

    /// Registry backing this writer
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Receiving end of the hand-off channel, for a `SegmentReader`
    pub fn published(&self) -> Receiver<(u64, File)> {
        self.opened_rx.clone()
    }

    /// Close the write segment and the registry
    pub fn close(&mut self) -> Result<()> {
        let segment_result = match self.file.take() {
            Some(file) => file.sync_all().map_err(|source| AtlasError::SegmentClose {
                number: self.current,
                source,
            }),
            None => Ok(()),
        };
        let registry_result = self.registry.close();

        segment_result.and(registry_result)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Create segment `number`, register it, open it for append and for read
    fn create_segment(&mut self, number: u64) -> Result<()> {
        let file = Self::open_for_append(&self.dir, number)
            .map_err(|source| AtlasError::SegmentOpen { number, source })?;

        self.registry.append(&segment_file_name(number))?;

        let reader = File::open(segment_path(&self.dir, number))
            .map_err(|source| AtlasError::SegmentOpen { number, source })?;

        self.file = Some(file);
        self.current = number;
        self.logical_size = 0;
        // The writer holds a receiver, so the channel is never disconnected.
        let _ = self.opened_tx.send((number, reader));

        tracing::debug!("Created segment {}", number);
        Ok(())
    }

    fn open_for_append(dir: &Path, number: u64) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(segment_path(dir, number))
    }

    #[cfg(test)]
    pub(crate) fn replace_file(&mut self, file: File) {
        self.file = Some(file);
    }
}
