//! Type wrappers for paths stored in TEXT columns
//!
//! - **`PathString`**: a path guaranteed to be valid UTF-8, ready to bind as a parameter
//! - **`DirPrefix`**: a directory path with exactly one trailing separator, used
//!   for "everything below this directory" prefix matches
//!
//! # Examples
//!
//! ```
//! use metanyx::db::types::{DirPrefix, PathString};
//!
//! let key = PathString::new("/data/a.txt").unwrap();
//! assert_eq!(&*key, "/data/a.txt");
//!
//! let prefix = DirPrefix::new("/data").unwrap();
//! assert!(prefix.ends_with('/'));
//! ```

use super::error::DbError;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Wrapper for a path that guarantees valid UTF-8 string representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathString(String);

impl TryFrom<PathBuf> for PathString {
    type Error = DbError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        path.into_os_string()
            .into_string()
            .map(Self)
            .map_err(|raw| {
                DbError::SerializeError(format!("Invalid UTF-8 in path {}", raw.to_string_lossy()))
            })
    }
}

impl TryFrom<&Path> for PathString {
    type Error = DbError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl PathString {
    /// # Errors
    ///
    /// Returns `DbError` if the path contains invalid UTF-8 characters.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let path = path.as_ref();
        path.to_str()
            .map(|s| Self(s.to_string()))
            .ok_or_else(|| {
                DbError::SerializeError(format!("Invalid UTF-8 in path {}", path.display()))
            })
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for PathString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for PathString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Directory path ending in a single separator
///
/// `/data` and `/data/` both become `/data/`, so a prefix match never picks
/// up the sibling `/database.db`. Matching itself happens in SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirPrefix(String);

impl DirPrefix {
    /// # Errors
    ///
    /// Returns `DbError` if the path contains invalid UTF-8 characters.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, DbError> {
        let mut prefix = PathString::new(dir)?.into_string();
        if !prefix.ends_with(std::path::is_separator) {
            prefix.push(MAIN_SEPARATOR);
        }
        Ok(Self(prefix))
    }
}

impl std::ops::Deref for DirPrefix {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
