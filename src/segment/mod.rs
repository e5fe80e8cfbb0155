//! Segment Module
//!
//! Size-bounded segment files plus the registry that orders them.
//!
//! ## Responsibilities
//! - Deterministic segment naming from a 1-based sequence number
//! - Durable, append-only registry of segment names (recovery source of truth)
//! - Append handle for the current write segment, rotation on size
//! - Read handles for every known segment and the record scan
//!
//! ## On-disk Layout
//! ```text
//! {data_dir}/
//! ├── events_files.registry     "events.1\nevents.2\n..."
//! ├── events.1                  record \n record \n ...
//! └── events.2                  record \n ...
//! ```
//!
//! Segment numbering comes from registry line order, never from a directory
//! listing. Line N of the registry is segment N.

mod registry;
mod writer;
mod reader;

use std::path::{Path, PathBuf};

pub use registry::Registry;
pub use writer::SegmentWriter;
pub use reader::SegmentReader;

/// Byte terminating every record on disk
pub const DELIMITER: u8 = b'\n';

/// File name of the registry under the data directory
pub const REGISTRY_FILE_NAME: &str = "events_files.registry";

const SEGMENT_FILE_PREFIX: &str = "events";

/// File name for segment `number`: "events.1", "events.2", ...
pub fn segment_file_name(number: u64) -> String {
    format!("{}.{}", SEGMENT_FILE_PREFIX, number)
}

/// Full path of segment `number` under `dir`
pub fn segment_path(dir: &Path, number: u64) -> PathBuf {
    dir.join(segment_file_name(number))
}
