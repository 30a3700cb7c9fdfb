//! Testing utilities for metanyx
//!
//! This module provides helper types and functions for writing tests: a
//! `TestDb` wrapper for a throwaway store and a `TempTree` for building small
//! directory fixtures. Everything lives under a `tempfile::TempDir`, so nothing
//! outlives the test.
//!
//! Only available when compiled with `cfg(test)`.

use crate::db::Database;
use crate::meta::{Entry, EntryType, extension_of};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Wrapper for a temporary test database that cleans up on drop
///
/// # Examples
/// ```ignore
/// let test_db = TestDb::new();
/// let db = test_db.db();
/// db.upsert(&sample_entry("/a.txt", EntryType::File)).unwrap();
/// assert_eq!(db.count().unwrap(), 1);
/// ```
pub struct TestDb {
    db: Database,
    path: PathBuf,
    // Declared last so the connection closes before the directory is removed
    _dir: TempDir,
}

impl TestDb {
    /// Create an empty store in a fresh temporary directory
    ///
    /// # Panics
    /// Panics if the directory or the database cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("metanyx-test.db");
        let db = Database::open(&path).expect("Failed to open test database");
        Self {
            db,
            path,
            _dir: dir,
        }
    }

    /// Get a reference to the underlying database
    #[must_use]
    pub const fn db(&self) -> &Database {
        &self.db
    }

    /// Get the path to the test database file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Temporary directory tree for scanner and mutation tests
pub struct TempTree {
    dir: TempDir,
}

impl TempTree {
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `rel`, creating parent directories
    ///
    /// # Panics
    /// Panics on any I/O failure.
    pub fn file(&self, rel: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Create directory `rel` (and its parents)
    ///
    /// # Panics
    /// Panics on any I/O failure.
    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(&path).expect("Failed to create test dir");
        path
    }
}

/// Synthetic entry for store-only tests; the path need not exist
#[must_use]
pub fn sample_entry(path: &str, entry_type: EntryType) -> Entry {
    let full_path = PathBuf::from(path);
    let name = full_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let is_file = entry_type == EntryType::File;
    Entry {
        ext: if is_file {
            extension_of(&name).to_string()
        } else {
            String::new()
        },
        hash: is_file.then(|| "0".repeat(64)),
        size: if is_file { 42 } else { 0 },
        full_path,
        name,
        entry_type,
        mtime_ms: 1_700_000_000_000,
        ctime_ms: 1_700_000_000_000,
        atime_ms: Some(1_700_000_000_000),
        mode: if is_file { 0o100_644 } else { 0o040_755 },
    }
}
