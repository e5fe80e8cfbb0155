//! Tests for Registry
//!
//! These tests verify:
//! - Creating the registry file on first open
//! - Appending segment names, one per line
//! - Reloading entries in line order
//! - Rejecting corrupted registries

use std::fs;
use std::path::PathBuf;

use atlaslog::segment::{Registry, REGISTRY_FILE_NAME};
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

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, dir) = setup_temp_dir();

    let registry = Registry::open(&dir).unwrap();

    assert!(dir.join(REGISTRY_FILE_NAME).exists());
    assert!(registry.is_empty());
    assert!(registry.is_open());
}

#[test]
fn test_open_missing_directory_fails() {
    let (_temp, dir) = setup_temp_dir();

    let result = Registry::open(&dir.join("does/not/exist"));

    assert!(matches!(result, Err(AtlasError::Registry(_))));
}

// =============================================================================
// Append / Reload Tests
// =============================================================================

#[test]
fn test_append_writes_lines() {
    let (_temp, dir) = setup_temp_dir();

    let mut registry = Registry::open(&dir).unwrap();
    registry.append("events.1").unwrap();
    registry.append("events.2").unwrap();

    assert_eq!(registry.len(), 2);
    let contents = fs::read_to_string(dir.join(REGISTRY_FILE_NAME)).unwrap();
    assert_eq!(contents, "events.1\nevents.2\n");
}

#[test]
fn test_reload_preserves_order() {
    let (_temp, dir) = setup_temp_dir();

    {
        let mut registry = Registry::open(&dir).unwrap();
        for n in 1..=5 {
            registry.append(&format!("events.{}", n)).unwrap();
        }
        registry.close().unwrap();
    }

    let registry = Registry::open(&dir).unwrap();
    let expected: Vec<String> = (1..=5).map(|n| format!("events.{}", n)).collect();
    assert_eq!(registry.entries(), expected.as_slice());
}

#[test]
fn test_reopen_appends_after_existing() {
    let (_temp, dir) = setup_temp_dir();

    {
        let mut registry = Registry::open(&dir).unwrap();
        registry.append("events.1").unwrap();
    }

    let mut registry = Registry::open(&dir).unwrap();
    registry.append("events.2").unwrap();

    let contents = fs::read_to_string(dir.join(REGISTRY_FILE_NAME)).unwrap();
    assert_eq!(contents, "events.1\nevents.2\n");
    assert_eq!(registry.entries(), ["events.1", "events.2"]);
}

#[test]
fn test_append_after_close_fails() {
    let (_temp, dir) = setup_temp_dir();

    let mut registry = Registry::open(&dir).unwrap();
    registry.close().unwrap();
    registry.close().unwrap();

    assert!(!registry.is_open());
    assert!(matches!(
        registry.append("events.1"),
        Err(AtlasError::Registry(_))
    ));
}

#[test]
fn test_empty_line_rejected() {
    let (_temp, dir) = setup_temp_dir();
    fs::write(dir.join(REGISTRY_FILE_NAME), "events.1\n\nevents.2\n").unwrap();

    let result = Registry::open(&dir);

    assert!(matches!(result, Err(AtlasError::Registry(_))));
}
