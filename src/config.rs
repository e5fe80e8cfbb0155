//! Configuration for AtlasLog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AtlasError, Result};

/// One kibibyte
pub const KB: u64 = 1 << 10;

/// One mebibyte
pub const MB: u64 = 1 << 20;

/// Main configuration for an event storage instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the registry and all segment files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── events_files.registry   (ordered segment names)
    ///     ├── events.1
    ///     ├── events.2
    ///     └── ...
    pub data_dir: PathBuf,

    /// Logical segment size (bytes) that triggers rotation
    pub segment_max_size: u64,

    // -------------------------------------------------------------------------
    // Flush Configuration
    // -------------------------------------------------------------------------
    /// Flush after this many buffered records, 0 disables
    pub auto_flush_count: usize,

    /// Flush periodically from a background thread, None disables
    pub auto_flush_interval: Option<Duration>,

    /// Call `sync_data` after every flush
    pub sync_on_flush: bool,

    // -------------------------------------------------------------------------
    // Read Configuration
    // -------------------------------------------------------------------------
    /// Size of the fixed chunk buffer used when scanning segments
    pub read_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./atlaslog_data"),
            segment_max_size: 100 * MB,
            auto_flush_count: 0,
            auto_flush_interval: None,
            sync_on_flush: false,
            read_chunk_size: 4 * KB as usize,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject values the storage cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.read_chunk_size == 0 {
            return Err(AtlasError::Config(
                "read_chunk_size must be greater than zero".to_string(),
            ));
        }

        if matches!(self.auto_flush_interval, Some(period) if period.is_zero()) {
            return Err(AtlasError::InvalidAutoFlushPeriod);
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for registry and segments)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the rotation threshold (in bytes)
    pub fn segment_max_size(mut self, size: u64) -> Self {
        self.config.segment_max_size = size;
        self
    }

    /// Set the auto-flush-by-count threshold
    pub fn auto_flush_count(mut self, count: usize) -> Self {
        self.config.auto_flush_count = count;
        self
    }

    /// Set the auto-flush-by-time period
    pub fn auto_flush_interval(mut self, period: Duration) -> Self {
        self.config.auto_flush_interval = Some(period);
        self
    }

    /// Enable or disable fsync after each flush
    pub fn sync_on_flush(mut self, enabled: bool) -> Self {
        self.config.sync_on_flush = enabled;
        self
    }

    /// Set the scan chunk size (in bytes)
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config.read_chunk_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
