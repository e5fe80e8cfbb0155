//! Segment Reader
//!
//! Read handles for every known segment, and the record scan across them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crossbeam::channel::Receiver;

use crate::error::{AtlasError, Result};

use super::DELIMITER;

/// Read side of the segment set
///
/// Holds one open read handle per segment, keyed by segment number, plus
/// the scratch state reused by every scan. The set only grows: once at
/// recovery per registry entry and once per created segment. Created
/// segments arrive through the attached hand-off channel, which is drained
/// before every scan and raw read.
pub struct SegmentReader {
    /// Segment number → read handle (iterates in ascending order)
    segments: BTreeMap<u64, File>,
    /// Handles of segments created by the writer, not yet inserted
    published: Option<Receiver<(u64, File)>>,
    /// Fixed-size chunk buffer
    chunk: Vec<u8>,
    /// Bytes of the record currently being assembled
    record: Vec<u8>,
    /// Records seen so far in the current scan
    scanned: u64,
    /// Records returned so far in the current scan
    collected: usize,
}

impl SegmentReader {
    /// Create an empty set with a scan chunk of `chunk_size` bytes
    pub fn new(chunk_size: usize) -> Self {
        Self {
            segments: BTreeMap::new(),
            published: None,
            chunk: vec![0u8; chunk_size.max(1)],
            record: Vec::new(),
            scanned: 0,
            collected: 0,
        }
    }

    /// Open every registered segment for read
    ///
    /// Line N of the registry becomes segment N. A missing or unreadable
    /// segment is fatal: skipping it would renumber every later record.
    pub fn load(dir: &Path, entries: &[String], chunk_size: usize) -> Result<Self> {
        let mut reader = Self::new(chunk_size);

        for (index, name) in entries.iter().enumerate() {
            let number = index as u64 + 1;
            let file = File::open(dir.join(name))
                .map_err(|source| AtlasError::SegmentOpen { number, source })?;
            reader.insert(number, file);
        }

        tracing::debug!("Recovered {} segment(s) for read", reader.len());
        Ok(reader)
    }

    /// Register the read handle of segment `number`
    pub fn insert(&mut self, number: u64, file: File) {
        self.segments.insert(number, file);
    }

    /// Receive created segments from a `SegmentWriter`
    pub fn attach(&mut self, published: Receiver<(u64, File)>) {
        self.published = Some(published);
        self.receive_published();
    }

    /// Insert every handle queued on the hand-off channel
    pub fn receive_published(&mut self) {
        if let Some(published) = &self.published {
            for (number, file) in published.try_iter() {
                self.segments.insert(number, file);
            }
        }
    }

    /// Number of segments open for read
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether segment `number` is open for read
    pub fn contains(&self, number: u64) -> bool {
        self.segments.contains_key(&number)
    }

    /// Collect up to `count` records starting at record `offset` (0-based)
    ///
    /// Only flushed bytes are visible. Running out of segments before
    /// `count` records are found is not an error; the records found so far
    /// are returned. An I/O failure inside a segment ends the scan of that
    /// segment only.
    pub fn scan(&mut self, count: usize, offset: u64) -> Vec<Vec<u8>> {
        self.receive_published();

        self.scanned = 0;
        self.collected = 0;
        self.record.clear();

        let mut events = Vec::with_capacity(count.min(1024));
        if count == 0 {
            return events;
        }

        // Scratch state stays open across segment boundaries.
        for (number, file) in self.segments.iter_mut() {
            if let Err(e) = file.seek(SeekFrom::Start(0)) {
                tracing::warn!("Seek failed on segment {}: {}", number, e);
                continue;
            }

            loop {
                let read = match file.read(&mut self.chunk) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!("Read failed on segment {}: {}", number, e);
                        break;
                    }
                };

                for &byte in &self.chunk[..read] {
                    if byte != DELIMITER {
                        self.record.push(byte);
                        continue;
                    }

                    if self.scanned >= offset {
                        events.push(self.record.clone());
                        self.collected += 1;
                    }
                    self.scanned += 1;
                    self.record.clear();

                    if self.collected >= count {
                        return events;
                    }
                }
            }
        }

        events
    }

    /// Raw positional read of up to `buf.len()` bytes from segment `number`
    pub fn read_at(&mut self, number: u64, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.receive_published();

        let file = self
            .segments
            .get_mut(&number)
            .ok_or(AtlasError::SegmentNotFound(number))?;

        file.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(filled)
    }

    /// Drop every read handle
    pub fn close(&mut self) {
        self.published = None;
        self.segments.clear();
        self.record = Vec::new();
    }
}
