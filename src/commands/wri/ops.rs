//! Filesystem side of each mutation
//!
//! These functions only touch the filesystem. Re-extracting and storing the
//! result is the executor's job.

use filetime::FileTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Set atime and mtime of `path` to now
pub(super) fn touch(path: &Path) -> io::Result<()> {
    let now = FileTime::now();
    filetime::set_file_times(path, now, now)
}

/// Move `time` by `delta_ms` milliseconds
fn shift(time: FileTime, delta_ms: i64) -> io::Result<FileTime> {
    const NANOS_PER_SEC: i128 = 1_000_000_000;

    let total = i128::from(time.unix_seconds()) * NANOS_PER_SEC
        + i128::from(time.nanoseconds())
        + i128::from(delta_ms) * 1_000_000;
    let secs = i64::try_from(total.div_euclid(NANOS_PER_SEC)).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "shifted time is out of range")
    })?;
    // rem_euclid is always in 0..1e9
    let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SEC)).unwrap_or(0);
    Ok(FileTime::from_unix_time(secs, nanos))
}

/// Add signed offsets to the current atime and mtime of `path`
///
/// Current values come from a fresh stat, not from the store.
pub(super) fn shift_times(path: &Path, mtime_delta: i64, atime_delta: i64) -> io::Result<()> {
    let md = fs::metadata(path)?;
    let atime = shift(FileTime::from_last_access_time(&md), atime_delta)?;
    let mtime = shift(FileTime::from_last_modification_time(&md), mtime_delta)?;
    filetime::set_file_times(path, atime, mtime)
}

/// Replace the permission bits of `path`
#[cfg(unix)]
pub(super) fn chmod(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

/// Only the write bits are meaningful here: no write bit means read-only
#[cfg(not(unix))]
pub(super) fn chmod(path: &Path, mode: u32) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, perms)
}

/// Rename `path` to `new_name` in the same directory, returning the new path
///
/// An existing destination is an error; nothing is overwritten. Renaming to
/// the current name is a no-op.
pub(super) fn rename_in_place(path: &Path, new_name: &str) -> io::Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    let dest = parent.join(new_name);
    if dest == path {
        fs::symlink_metadata(path)?;
        return Ok(dest);
    }
    if fs::symlink_metadata(&dest).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination {} already exists", dest.display()),
        ));
    }
    fs::rename(path, &dest)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_shift_handles_negative_and_carry() {
        let t = FileTime::from_unix_time(10, 500_000_000);
        assert_eq!(shift(t, 600).unwrap(), FileTime::from_unix_time(11, 100_000_000));
        assert_eq!(shift(t, -600).unwrap(), FileTime::from_unix_time(9, 900_000_000));
        assert_eq!(shift(t, -20_000).unwrap(), FileTime::from_unix_time(-10, 500_000_000));
    }

    #[test]
    fn test_shift_times_moves_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, b"x").unwrap();
        let base = FileTime::from_unix_time(1_700_000_000, 0);
        filetime::set_file_times(&path, base, base).unwrap();

        shift_times(&path, 3_600_000, -1_000).unwrap();

        let md = fs::metadata(&path).unwrap();
        assert_eq!(
            FileTime::from_last_modification_time(&md).unix_seconds(),
            1_700_003_600
        );
        assert_eq!(FileTime::from_last_access_time(&md).unix_seconds(), 1_699_999_999);
    }

    #[test]
    fn test_rename_refuses_existing_destination() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let err = rename_in_place(&a, "b.txt").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&b).unwrap(), b"b");
        assert!(a.exists());
    }

    #[test]
    fn test_rename_to_same_name_is_noop() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, b"a").unwrap();

        assert_eq!(rename_in_place(&a, "a.txt").unwrap(), a);
        assert!(a.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_chmod_sets_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.sh");
        fs::write(&path, b"#!/bin/sh").unwrap();

        chmod(&path, 0o750).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o750);
    }
}
