//! Recursive directory scanner
//!
//! Walks a directory depth-first, pre-order (a directory is yielded before its
//! children), without following symlinks. Children of each directory are
//! visited in file-name order so repeated walks produce the same sequence.
//!
//! Two ways to consume a walk:
//! - pull: iterate a [`Scanner`], which yields `Result<Entry, MetaError>` per child
//! - push: [`scan_dir`] invokes a callback per record and stops at the first error
//!
//! A walk is not resumable; creating a new [`Scanner`] starts over from the root.
//! Listing or stat failures are never swallowed here, the caller decides
//! whether a partial index is acceptable.

use super::{Entry, FileStat, MetaError, read_meta};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Lazy, pull-based walk over everything below a root directory
///
/// The root itself is not yielded.
pub struct Scanner {
    root: PathBuf,
    walker: walkdir::IntoIter,
}

impl Scanner {
    /// Prepare a walk below `root`; nothing touches the filesystem until the first `next()`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let walker = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self { root, walker }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for Scanner {
    type Item = Result<Entry, MetaError>;

    fn next(&mut self) -> Option<Self::Item> {
        let dent = match self.walker.next()? {
            Ok(dent) => dent,
            Err(e) => return Some(Err(MetaError::Walk(e))),
        };

        // follow_links(false) makes this an lstat
        let md = match dent.metadata() {
            Ok(md) => md,
            Err(e) => return Some(Err(MetaError::Walk(e))),
        };

        debug!(path = %dent.path().display(), depth = dent.depth(), "visit");
        Some(Ok(read_meta(dent.path(), &FileStat::from(&md))))
    }
}

/// Walk `root`, handing each record to `on_entry`
///
/// Stops at the first walk error or callback error and returns it.
///
/// # Returns
/// Number of records handed to the callback
///
/// # Errors
///
/// Returns the callback's error, or a [`MetaError`] converted into `E` when a
/// child cannot be listed or stat'ed.
pub fn scan_dir<F, E>(root: &Path, mut on_entry: F) -> Result<usize, E>
where
    F: FnMut(Entry) -> Result<(), E>,
    E: From<MetaError>,
{
    let mut visited = 0;
    for record in Scanner::new(root) {
        on_entry(record?)?;
        visited += 1;
    }
    Ok(visited)
}
