//! # AtlasLog
//!
//! An embeddable append-only event log with:
//! - Opaque byte records, newline-delimited on disk
//! - Size-bounded segment files with automatic rotation
//! - Registry-based crash recovery (segment order is the registry's line order)
//! - Buffered writes with count- and time-based auto-flush
//! - Skip/limit pagination across all segments
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      EventStorage                            │
//! │        write / flush / read / set_* / shutdown               │
//! └───────────┬──────────────────────────────────┬──────────────┘
//!             │ write lock                       │ read lock
//!             ▼                                  ▼
//!   ┌───────────────────┐              ┌───────────────────┐
//!   │    WriteState     │   new        │   SegmentReader   │
//!   │ buffer + policy   │   segments   │  read handles +   │
//!   │                   │ ───────────▶ │  record scan      │
//!   └─────────┬─────────┘              └─────────┬─────────┘
//!             ▼                                  │
//!   ┌───────────────────┐                        │
//!   │   SegmentWriter   │                        │
//!   │ append + rotate   │                        │
//!   └─────────┬─────────┘                        │
//!             ▼                                  ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │   events_files.registry    events.1  events.2  ...      │
//!   └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use atlaslog::{Config, EventStorage};
//!
//! let config = Config::builder().data_dir("./events").auto_flush_count(1).build();
//! let storage = EventStorage::open(config)?;
//!
//! storage.write(b"first")?;
//! storage.write(b"second")?;
//!
//! let events = storage.read(10, 0);
//! assert_eq!(events, vec![b"first".to_vec(), b"second".to_vec()]);
//!
//! storage.shutdown();
//! # Ok::<(), atlaslog::AtlasError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod segment;
pub mod buffer;
pub mod flusher;
pub mod sink;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AtlasError, Result};
pub use config::{Config, KB, MB};
pub use engine::EventStorage;
pub use sink::{DiagnosticSink, TracingSink, WriterSink};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of AtlasLog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
