//! Errors raised while extracting metadata or walking a directory tree
//!
//! Hash failures are deliberately absent: an unreadable file still yields an
//! [`Entry`](super::Entry) with `hash = None`. Only failures that leave no
//! usable record (missing target, failed stat, failed directory listing)
//! surface here.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Metadata extraction and scanning errors
#[derive(Debug, Error)]
pub enum MetaError {
    /// The requested path does not exist
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Stat or other I/O failure on a specific path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A child could not be listed or stat'ed during a directory walk
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl MetaError {
    /// Map an I/O error on `path`, turning `NotFound` into [`MetaError::PathNotFound`]
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::PathNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}
