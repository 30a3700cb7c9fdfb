//! Change-time refresh
//!
//! ctime is maintained by the filesystem and has no setter. The only supported
//! operation is bumping it to "now": renaming an inode stamps a new ctime, so
//! the file is moved to a hidden sibling name and straight back.

use crate::meta::system_time_millis;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

/// Why a ctime refresh failed, and whether the file moved
#[derive(Debug, Error)]
pub enum CtimeError {
    /// The file was not moved
    #[error("{0}")]
    Io(#[from] io::Error),

    /// The file reached the temporary name but could not be moved back
    #[error("file left at {} after ctime refresh: {source}", .left_at.display())]
    Stranded { left_at: PathBuf, source: io::Error },
}

impl CtimeError {
    /// Where the file is now, if it is no longer at the original path
    #[must_use]
    pub fn left_at(&self) -> Option<&Path> {
        match self {
            Self::Io(_) => None,
            Self::Stranded { left_at, .. } => Some(left_at),
        }
    }
}

/// Hidden sibling used for the round trip: `.{name}.ctime_touch_{millis}`
fn temp_sibling(path: &Path) -> io::Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let millis = system_time_millis(SystemTime::now());
    Ok(parent.join(format!(
        ".{}.ctime_touch_{millis}",
        name.to_string_lossy()
    )))
}

/// Refresh the change time of `path` to the current time
///
/// The resulting ctime is whatever the filesystem records for the renames.
///
/// # Errors
///
/// Returns [`CtimeError::Io`] if the temporary name is taken or the first
/// rename fails, and [`CtimeError::Stranded`] if only the rename back fails.
pub fn refresh_ctime(path: &Path) -> Result<(), CtimeError> {
    let temp = temp_sibling(path)?;
    if fs::symlink_metadata(&temp).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("temporary name {} already exists", temp.display()),
        )
        .into());
    }

    fs::rename(path, &temp)?;
    if let Err(source) = fs::rename(&temp, path) {
        return Err(CtimeError::Stranded {
            left_at: temp,
            source,
        });
    }
    debug!(path = %path.display(), "refreshed ctime");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_refresh_ctime_keeps_file_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keep.txt");
        fs::write(&path, b"content").unwrap();

        refresh_ctime(&path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"content");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_refresh_ctime_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = refresh_ctime(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(&err, CtimeError::Io(e) if e.kind() == io::ErrorKind::NotFound));
        assert!(err.left_at().is_none());
    }

    #[test]
    fn test_stranded_error_names_temp_path() {
        let err = CtimeError::Stranded {
            left_at: PathBuf::from("/data/.a.txt.ctime_touch_1"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.left_at(), Some(Path::new("/data/.a.txt.ctime_touch_1")));
        assert!(err.to_string().starts_with("file left at /data/.a.txt.ctime_touch_1"));
    }

    #[test]
    fn test_temp_sibling_is_hidden_neighbor() {
        let temp = temp_sibling(Path::new("/data/a.txt")).unwrap();
        assert_eq!(temp.parent(), Some(Path::new("/data")));
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".a.txt.ctime_touch_"));
    }
}
