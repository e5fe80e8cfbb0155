//! Segment Registry
//!
//! Append-only text file listing segment names in creation order.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{AtlasError, Result};

use super::REGISTRY_FILE_NAME;

/// Durable list of segment file names
///
/// Opened once in read+append mode and kept open for the lifetime of the
/// storage. Lines are only ever appended.
pub struct Registry {
    /// Registry file path
    path: PathBuf,
    /// Open handle, None after close
    file: Option<File>,
    /// Segment names, index 0 = segment 1
    entries: Vec<String>,
}

impl Registry {
    /// Open (creating if absent) the registry under `dir` and load its lines
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(REGISTRY_FILE_NAME);

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                AtlasError::Registry(format!("Failed to open {}: {}", path.display(), e))
            })?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(&file).lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                // An empty line would shift every following segment number.
                return Err(AtlasError::Registry(format!(
                    "Empty entry at line {} of {}",
                    index + 1,
                    path.display()
                )));
            }
            entries.push(line);
        }

        tracing::debug!(
            "Registry {} loaded with {} segment(s)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            file: Some(file),
            entries,
        })
    }

    /// Append one segment name as a new line
    pub fn append(&mut self, name: &str) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            AtlasError::Registry("Cannot append to a closed registry".to_string())
        })?;

        let mut line = Vec::with_capacity(name.len() + 1);
        line.extend_from_slice(name.as_bytes());
        line.push(b'\n');

        file.write_all(&line)
            .and_then(|_| file.sync_data())
            .map_err(|e| AtlasError::Registry(format!("Failed to append {}: {}", name, e)))?;

        self.entries.push(name.to_string());
        Ok(())
    }

    /// Segment names in creation order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of registered segments (also the highest segment number)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the registry file handle is still open
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Registry file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the registry handle. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }
}
