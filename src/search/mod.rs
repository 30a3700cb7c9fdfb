//! Filter/mode resolution
//!
//! Decides which store query answers a request made of an optional target
//! path, an optional explicit [`QueryMode`] and a [`SearchFilters`] set, then
//! runs it:
//!
//! 1. an explicit mode always wins
//! 2. no target and no filter: unrestricted search
//! 3. a target ending in a separator (`src/`): list everything under it
//! 4. any other target: exact single-path lookup
//! 5. filters without a target: filtered search, restricted to files unless
//!    the caller chose a type
//!
//! List results are post-filtered to files; directory rows never take part in
//! batch mutation.

pub mod error;

pub use error::SearchError;

use crate::db::{Database, SearchFilters};
use crate::meta::{self, Entry, EntryType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

type Result<T> = std::result::Result<T, SearchError>;

/// Query strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Exact lookup of one path
    Single,
    /// Files strictly below a directory
    List,
    /// Filtered search over the whole store
    Search,
}

impl QueryMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::List => "list",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "list" => Ok(Self::List),
            "search" => Ok(Self::Search),
            other => Err(format!(
                "Unknown mode '{other}' (expected 'single', 'list' or 'search')"
            )),
        }
    }
}

/// Rows returned by [`perform_search`] with the mode that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub rows: Vec<Entry>,
    pub mode: QueryMode,
    /// Absolute form of the target, if one was given
    pub target: Option<PathBuf>,
}

/// Pick the query strategy for a request
///
/// Filters never change the mode, only the defaults applied in search mode.
/// `target` is inspected as typed: the trailing separator hint is lost once a
/// path is normalized, so this must run on the raw argument.
#[must_use]
pub fn effective_mode(target: Option<&Path>, mode: Option<QueryMode>) -> QueryMode {
    if let Some(mode) = mode {
        return mode;
    }
    match target.filter(|t| !t.as_os_str().is_empty()) {
        Some(t) if meta::has_trailing_separator(t) => QueryMode::List,
        Some(_) => QueryMode::Single,
        None => QueryMode::Search,
    }
}

/// Resolve the mode and run the matching store query
///
/// # Arguments
/// * `db` - Open store
/// * `target` - Optional target path as given by the caller (relative paths
///   resolve against the current directory)
/// * `mode` - Explicit mode, overriding the inferred one
/// * `filters` - Filter set; `under` is normalized before use
///
/// # Errors
///
/// Returns `SearchError::MissingTarget` or `SearchError::MissingUnder` when the
/// chosen mode lacks its input, or `SearchError::DatabaseError` if the query fails.
pub fn perform_search(
    db: &Database,
    target: Option<&Path>,
    mode: Option<QueryMode>,
    filters: &SearchFilters,
) -> Result<SearchOutcome> {
    let target = target.filter(|t| !t.as_os_str().is_empty());
    let mode = effective_mode(target, mode);
    let abs_target = target.map(meta::normalize_absolute).transpose()?;
    debug!(%mode, target = ?abs_target, "resolved query mode");

    let rows = match mode {
        QueryMode::Single => {
            let path = abs_target.as_deref().ok_or(SearchError::MissingTarget)?;
            db.get_by_path(path)?.into_iter().collect()
        }
        QueryMode::List => {
            let dir = match (&abs_target, &filters.under) {
                (Some(dir), _) => dir.clone(),
                (None, Some(under)) if !under.as_os_str().is_empty() => {
                    meta::normalize_absolute(under)?
                }
                _ => return Err(SearchError::MissingUnder),
            };
            file_rows(db.list_under(&dir)?)
        }
        QueryMode::Search => db.search(&search_filters(filters)?)?,
    };

    Ok(SearchOutcome {
        rows,
        mode,
        target: abs_target,
    })
}

/// Apply search-mode defaults: absolute `under`, and files only when any filter is set
fn search_filters(filters: &SearchFilters) -> Result<SearchFilters> {
    if !filters.has_any() {
        return Ok(SearchFilters::default());
    }
    let mut resolved = filters.clone();
    if let Some(under) = resolved.under.take() {
        if !under.as_os_str().is_empty() {
            resolved.under = Some(meta::normalize_absolute(under)?);
        }
    }
    resolved.entry_type.get_or_insert(EntryType::File);
    Ok(resolved)
}

/// Keep only `type=file` rows, preserving order
#[must_use]
pub fn file_rows(rows: Vec<Entry>) -> Vec<Entry> {
    rows.into_iter().filter(Entry::is_file).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestDb, sample_entry};

    fn seeded() -> TestDb {
        let test_db = TestDb::new();
        let db = test_db.db();
        for (path, kind) in [
            ("/data", EntryType::Dir),
            ("/data/a.txt", EntryType::File),
            ("/data/b.js", EntryType::File),
            ("/data/sub", EntryType::Dir),
            ("/data/sub/c.js", EntryType::File),
            ("/other/x.txt", EntryType::File),
        ] {
            db.upsert(&sample_entry(path, kind)).unwrap();
        }
        test_db
    }

    fn paths(outcome: &SearchOutcome) -> Vec<&str> {
        outcome
            .rows
            .iter()
            .map(|e| e.full_path.to_str().unwrap())
            .collect()
    }

    #[test]
    fn test_explicit_mode_wins() {
        assert_eq!(
            effective_mode(Some(Path::new("/data/")), Some(QueryMode::Search)),
            QueryMode::Search
        );
    }

    #[test]
    fn test_inferred_modes() {
        assert_eq!(effective_mode(None, None), QueryMode::Search);
        assert_eq!(effective_mode(Some(Path::new("")), None), QueryMode::Search);
        assert_eq!(effective_mode(Some(Path::new("src/")), None), QueryMode::List);
        assert_eq!(effective_mode(Some(Path::new("src")), None), QueryMode::Single);
    }

    #[test]
    fn test_unrestricted_search_includes_dirs() {
        let test_db = seeded();
        let outcome = perform_search(test_db.db(), None, None, &SearchFilters::default()).unwrap();
        assert_eq!(outcome.mode, QueryMode::Search);
        assert_eq!(outcome.rows.len(), 6);
        assert!(outcome.rows.iter().any(Entry::is_dir));
    }

    #[test]
    fn test_filtered_search_defaults_to_files() {
        let test_db = seeded();
        let filters = SearchFilters {
            name: Some("a".into()),
            ..SearchFilters::default()
        };
        let outcome = perform_search(test_db.db(), None, None, &filters).unwrap();
        // "/data" matches the name filter but is a directory
        assert_eq!(paths(&outcome), vec!["/data/a.txt"]);
    }

    #[test]
    fn test_filtered_search_honors_explicit_type() {
        let test_db = seeded();
        let filters = SearchFilters {
            name: Some("a".into()),
            entry_type: Some(EntryType::Dir),
            ..SearchFilters::default()
        };
        let outcome = perform_search(test_db.db(), None, None, &filters).unwrap();
        assert_eq!(paths(&outcome), vec!["/data"]);
    }

    #[test]
    fn test_list_mode_returns_files_only() {
        let test_db = seeded();
        let outcome =
            perform_search(test_db.db(), Some(Path::new("/data/")), None, &SearchFilters::default())
                .unwrap();
        assert_eq!(outcome.mode, QueryMode::List);
        assert_eq!(paths(&outcome), vec!["/data/a.txt", "/data/b.js", "/data/sub/c.js"]);
    }

    #[test]
    fn test_list_mode_falls_back_to_under() {
        let test_db = seeded();
        let filters = SearchFilters {
            under: Some(PathBuf::from("/data/sub")),
            ..SearchFilters::default()
        };
        let outcome =
            perform_search(test_db.db(), None, Some(QueryMode::List), &filters).unwrap();
        assert_eq!(paths(&outcome), vec!["/data/sub/c.js"]);
    }

    #[test]
    fn test_list_mode_without_directory() {
        let test_db = seeded();
        let err = perform_search(
            test_db.db(),
            None,
            Some(QueryMode::List),
            &SearchFilters::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::MissingUnder));
    }

    #[test]
    fn test_single_mode() {
        let test_db = seeded();
        let hit =
            perform_search(test_db.db(), Some(Path::new("/data/b.js")), None, &SearchFilters::default())
                .unwrap();
        assert_eq!(hit.mode, QueryMode::Single);
        assert_eq!(paths(&hit), vec!["/data/b.js"]);

        let miss =
            perform_search(test_db.db(), Some(Path::new("/data/zz")), None, &SearchFilters::default())
                .unwrap();
        assert!(miss.rows.is_empty());
    }

    #[test]
    fn test_single_mode_requires_target() {
        let test_db = seeded();
        let err = perform_search(
            test_db.db(),
            None,
            Some(QueryMode::Single),
            &SearchFilters::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::MissingTarget));
    }

    #[test]
    fn test_search_under_is_prefix_restricted() {
        let test_db = seeded();
        let filters = SearchFilters {
            under: Some(PathBuf::from("/data/sub/../sub")),
            ext: Some(".js".into()),
            ..SearchFilters::default()
        };
        let outcome = perform_search(test_db.db(), None, None, &filters).unwrap();
        assert_eq!(paths(&outcome), vec!["/data/sub/c.js"]);
    }

    #[test]
    fn test_query_mode_parse() {
        assert_eq!("LIST".parse::<QueryMode>().unwrap(), QueryMode::List);
        assert!("tree".parse::<QueryMode>().is_err());
        assert_eq!(QueryMode::Single.to_string(), "single");
    }
}
