//! Tests for SegmentWriter
//!
//! These tests verify:
//! - First initialization creates and registers segment 1
//! - Reopening continues the last registered segment
//! - Rotation numbering, registry growth and read handles
//! - Logical size bookkeeping

use std::fs;
use std::path::PathBuf;

use atlaslog::segment::{segment_path, Registry, SegmentWriter, REGISTRY_FILE_NAME};
use atlaslog::AtlasError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}

fn open_writer(dir: &PathBuf, max_size: u64) -> SegmentWriter {
    let registry = Registry::open(dir).unwrap();
    SegmentWriter::open(dir, registry, max_size).unwrap()
}

/// Segment numbers queued on the hand-off channel and not yet received
fn drain_published(writer: &SegmentWriter) -> Vec<u64> {
    writer.published().try_iter().map(|(number, _)| number).collect()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_first_segment() {
    let (_temp, dir) = setup_temp_dir();

    let writer = open_writer(&dir, 1024);

    assert!(writer.is_active());
    assert_eq!(writer.current(), 1);
    assert_eq!(writer.logical_size(), 0);
    assert!(segment_path(&dir, 1).exists());
    assert_eq!(writer.registry().entries(), ["events.1"]);

    assert_eq!(drain_published(&writer), vec![1]);
    assert!(drain_published(&writer).is_empty());
}

#[test]
fn test_init_reopens_last_segment() {
    let (_temp, dir) = setup_temp_dir();

    {
        let mut writer = open_writer(&dir, 1024);
        writer.rotate().unwrap();
        writer.append(b"abc\n").unwrap();
        writer.close().unwrap();
    }

    let writer = open_writer(&dir, 1024);

    assert_eq!(writer.current(), 2);
    assert_eq!(writer.logical_size(), 4);
    assert_eq!(writer.current_size().unwrap(), 4);
    // Nothing new was created
    assert!(drain_published(&writer).is_empty());
    assert_eq!(writer.registry().len(), 2);
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_append_goes_to_current_segment() {
    let (_temp, dir) = setup_temp_dir();

    let mut writer = open_writer(&dir, 1024);
    writer.append(b"one\n").unwrap();
    writer.append(b"two\n").unwrap();

    assert_eq!(fs::read(segment_path(&dir, 1)).unwrap(), b"one\ntwo\n");
    // Logical size is driven by the buffer, not by appends
    assert_eq!(writer.logical_size(), 0);
}

// =============================================================================
// Rotation Tests
// =============================================================================

#[test]
fn test_rotate_creates_next_segment() {
    let (_temp, dir) = setup_temp_dir();

    let mut writer = open_writer(&dir, 10);
    drain_published(&writer);
    writer.add_logical_size(12);
    assert!(writer.needs_rotation());

    writer.rotate().unwrap();

    assert_eq!(writer.current(), 2);
    assert_eq!(writer.logical_size(), 0);
    assert!(!writer.needs_rotation());
    assert!(segment_path(&dir, 2).exists());

    // Queued for readers by the time rotate returns
    assert_eq!(drain_published(&writer), vec![2]);
}

#[test]
fn test_rotate_extends_registry_in_order() {
    let (_temp, dir) = setup_temp_dir();

    let mut writer = open_writer(&dir, 10);
    for _ in 0..3 {
        writer.rotate().unwrap();
    }

    let contents = fs::read_to_string(dir.join(REGISTRY_FILE_NAME)).unwrap();
    assert_eq!(contents, "events.1\nevents.2\nevents.3\nevents.4\n");
    assert_eq!(drain_published(&writer), vec![1, 2, 3, 4]);
}

#[test]
fn test_rotate_with_closed_registry_fails() {
    let (_temp, dir) = setup_temp_dir();

    let mut writer = open_writer(&dir, 10);
    writer.append(b"x\n").unwrap();
    writer.close().unwrap();

    // The registry is closed too, so the new segment cannot be registered.
    let result = writer.rotate();
    assert!(matches!(result, Err(AtlasError::Registry(_))));
    assert!(!writer.is_active());
}

#[test]
fn test_max_size_setter() {
    let (_temp, dir) = setup_temp_dir();

    let mut writer = open_writer(&dir, 100);
    writer.add_logical_size(50);
    assert!(!writer.needs_rotation());

    writer.set_max_size(50);
    assert_eq!(writer.max_size(), 50);
    assert!(writer.needs_rotation());
}
