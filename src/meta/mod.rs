//! Metadata extraction for indexed filesystem entries
//!
//! Turns a path plus its stat result into an [`Entry`], the record stored in
//! the index. Files additionally get a SHA-256 content hash; a file that cannot
//! be read while hashing degrades to `hash = None` instead of failing the
//! extraction.
//!
//! # Examples
//!
//! ```no_run
//! use metanyx::meta;
//!
//! let entry = meta::extract("/tmp/notes.txt").unwrap();
//! assert_eq!(entry.name, "notes.txt");
//! assert_eq!(entry.ext, ".txt");
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

pub mod error;
pub mod scan;

pub use error::MetaError;
pub use scan::{Scanner, scan_dir};

/// Kind of filesystem object an entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
}

impl EntryType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is neither `file` nor `dir`
#[derive(Debug, Clone, Error)]
#[error("Unknown entry type '{0}' (expected 'file' or 'dir')")]
pub struct ParseEntryTypeError(pub String);

impl FromStr for EntryType {
    type Err = ParseEntryTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "dir" | "directory" => Ok(Self::Dir),
            other => Err(ParseEntryTypeError(other.to_string())),
        }
    }
}

/// One indexed path and its captured metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Absolute, normalized path; unique key in the store
    pub full_path: PathBuf,
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Size in bytes, always 0 for directories
    pub size: u64,
    pub mtime_ms: i64,
    pub ctime_ms: i64,
    /// Nullable because rows written before the column existed carry no value
    pub atime_ms: Option<i64>,
    pub mode: u32,
    /// Extension including the leading dot, empty for directories
    pub ext: String,
    /// Hex SHA-256 of the content, `None` for directories and unreadable files
    pub hash: Option<String>,
}

impl Entry {
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.entry_type, EntryType::File)
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.entry_type, EntryType::Dir)
    }
}

/// The subset of a stat result the extractor needs
///
/// Timestamps are epoch milliseconds. Built from [`std::fs::Metadata`] (as
/// returned by `symlink_metadata`, so symlinks are not followed), but can be
/// constructed directly in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub mtime_ms: i64,
    pub ctime_ms: i64,
    pub atime_ms: i64,
    pub mode: u32,
    pub is_dir: bool,
    /// Regular file; false for directories, symlinks, FIFOs, sockets and devices
    pub is_file: bool,
}

#[cfg(unix)]
impl From<&Metadata> for FileStat {
    fn from(md: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        Self {
            size: md.size(),
            mtime_ms: to_millis(md.mtime(), md.mtime_nsec()),
            ctime_ms: to_millis(md.ctime(), md.ctime_nsec()),
            atime_ms: to_millis(md.atime(), md.atime_nsec()),
            mode: md.mode(),
            is_dir: md.is_dir(),
            is_file: md.file_type().is_file(),
        }
    }
}

#[cfg(not(unix))]
impl From<&Metadata> for FileStat {
    fn from(md: &Metadata) -> Self {
        let mtime_ms = md.modified().map(system_time_millis).unwrap_or_default();
        // No inode change time here; creation time is the closest stand-in.
        let ctime_ms = md.created().map(system_time_millis).unwrap_or(mtime_ms);
        let atime_ms = md.accessed().map(system_time_millis).unwrap_or(mtime_ms);
        let mode = if md.permissions().readonly() { 0o444 } else { 0o666 };

        Self {
            size: md.len(),
            mtime_ms,
            ctime_ms,
            atime_ms,
            mode,
            is_dir: md.is_dir(),
            is_file: md.file_type().is_file(),
        }
    }
}

#[cfg(unix)]
const fn to_millis(secs: i64, nsec: i64) -> i64 {
    secs * 1000 + nsec / 1_000_000
}

/// Milliseconds since the epoch, negative for times before it
#[must_use]
pub fn system_time_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX),
    }
}

/// Build an [`Entry`] for `path` from an already obtained stat result
///
/// Only regular files are opened and hashed. Other non-directory objects
/// (symlinks, FIFOs, sockets, devices) are stored as files with `hash = None`,
/// since opening a FIFO blocks and a symlink's content belongs to its target.
///
/// Never fails: hashing errors are logged and recorded as `hash = None`.
#[must_use]
pub fn read_meta(path: &Path, stat: &FileStat) -> Entry {
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );

    let (entry_type, ext, hash, size) = if stat.is_dir {
        (EntryType::Dir, String::new(), None, 0)
    } else {
        let ext = extension_of(&name).to_string();
        let hash = if stat.is_file { hash_file(path) } else { None };
        (EntryType::File, ext, hash, stat.size)
    };

    Entry {
        full_path: path.to_path_buf(),
        name,
        entry_type,
        size,
        mtime_ms: stat.mtime_ms,
        ctime_ms: stat.ctime_ms,
        atime_ms: Some(stat.atime_ms),
        mode: stat.mode,
        ext,
        hash,
    }
}

/// lstat `path` without following symlinks
///
/// # Errors
///
/// Returns [`MetaError::PathNotFound`] if nothing exists at `path`, or
/// [`MetaError::Io`] for any other stat failure.
pub fn stat_path(path: &Path) -> Result<FileStat, MetaError> {
    let md = fs::symlink_metadata(path).map_err(|e| MetaError::from_io(path, e))?;
    Ok(FileStat::from(&md))
}

/// Stat and extract a single path in one step
///
/// # Errors
///
/// Returns `MetaError` if the path cannot be stat'ed.
pub fn extract<P: AsRef<Path>>(path: P) -> Result<Entry, MetaError> {
    let path = path.as_ref();
    let stat = stat_path(path)?;
    Ok(read_meta(path, &stat))
}

/// Hex SHA-256 of a file's content, `None` if it cannot be read
#[must_use]
pub fn hash_file(path: &Path) -> Option<String> {
    match try_hash_file(path) {
        Ok(digest) => Some(digest),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not hash file, storing null hash");
            None
        }
    }
}

fn try_hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let bytes = io::copy(&mut file, &mut hasher)?;
    debug!(path = %path.display(), bytes, "hashed file");
    Ok(hex::encode(hasher.finalize()))
}

/// Extension of a base name, including the leading dot
///
/// A leading dot alone (`.bashrc`) is not an extension. Purely lexical.
#[must_use]
pub fn extension_of(name: &str) -> &str {
    if name.chars().all(|c| c == '.') {
        return "";
    }
    match name.rfind('.') {
        None | Some(0) => "",
        Some(idx) => &name[idx..],
    }
}

/// Resolve `path` against the current directory and clean `.`/`..` lexically
///
/// Symlinks are not resolved, so the result names the link itself rather than
/// its target, matching what the scanner records.
///
/// # Errors
///
/// Returns an `io::Error` if the current directory cannot be determined.
pub fn normalize_absolute<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Whether `path` as typed ends with a path separator (`dir/`)
#[must_use]
pub fn has_trailing_separator(path: &Path) -> bool {
    path.as_os_str()
        .to_string_lossy()
        .chars()
        .last()
        .is_some_and(std::path::is_separator)
}
