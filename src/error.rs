//! Error types for AtlasLog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using AtlasError
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Unified error type for AtlasLog operations
#[derive(Debug, Error)]
pub enum AtlasError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Registry Errors
    // -------------------------------------------------------------------------
    #[error("Registry error: {0}")]
    Registry(String),

    // -------------------------------------------------------------------------
    // Segment Errors
    // -------------------------------------------------------------------------
    #[error("Segment init failed: {0}")]
    SegmentInit(String),

    #[error("Failed to open segment {number}: {source}")]
    SegmentOpen {
        number: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to close segment {number}: {source}")]
    SegmentClose {
        number: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Segment {0} does not exist")]
    SegmentNotFound(u64),

    // -------------------------------------------------------------------------
    // Write Path Errors
    // -------------------------------------------------------------------------
    #[error("Flush failed: {0}")]
    Flush(#[source] std::io::Error),

    #[error("Flushed {flushed} record(s) but sync failed: {source}")]
    FlushSync {
        flushed: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Rotation failed: {0}")]
    Rotate(#[source] Box<AtlasError>),

    // -------------------------------------------------------------------------
    // Auto-flush Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Auto flush time already set")]
    AutoFlushTimeAlreadySet,

    #[error("Auto flush period must be greater than zero")]
    InvalidAutoFlushPeriod,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Event storage is shut down")]
    Closed,
}
