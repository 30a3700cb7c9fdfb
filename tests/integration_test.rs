//! Integration tests for metanyx
//!
//! These tests drive the public API end to end against a temporary store and a
//! temporary directory tree: index, query, mutate, and check that the store
//! follows the disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use metanyx::commands::read::{ReadOptions, index_path};
use metanyx::commands::wri::{self, BatchReport, Operation, WriDirective, WriOp};
use metanyx::db::{Database, SearchFilters};
use metanyx::meta::EntryType;
use metanyx::search::{self, QueryMode};
use metanyx::timeexpr::{Bound, parse_absolute, parse_delta};
use tempfile::TempDir;

/// Store plus a scratch tree, both removed on drop
struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    db: Database,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap().join("tree");
        fs::create_dir_all(&root).unwrap();
        let db = Database::open(dir.path().join("metanyx.db")).unwrap();
        Self { _dir: dir, root, db }
    }

    fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn index(&self) {
        index_path(&self.db, &self.root, ReadOptions::default()).unwrap();
    }
}

fn now_ms() -> i64 {
    i64::try_from(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis()).unwrap()
}

fn with_dir_separator(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(std::path::MAIN_SEPARATOR_STR);
    PathBuf::from(s)
}

#[test]
fn test_index_search_and_clear() {
    let fx = Fixture::new();
    fx.file("a.txt", "alpha");
    fx.file("b.js", "console.log(1)");
    let opts = ReadOptions {
        files_only: true,
        ..ReadOptions::default()
    };

    let report = index_path(&fx.db, &fx.root, opts).unwrap();
    assert_eq!(report.written.len(), 2);
    assert_eq!(fx.db.count().unwrap(), 2);

    let filters = SearchFilters {
        ext: Some("js".into()),
        ..SearchFilters::default()
    };
    let hits = fx.db.search(&filters).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "b.js");
    assert_eq!(hits[0].ext, ".js");

    let cleared = fx.db.clear().unwrap();
    assert_eq!(cleared.before, 2);
    assert_eq!(cleared.after, 0);
}

#[test]
fn test_unfiltered_search_includes_directories() {
    let fx = Fixture::new();
    fx.file("sub/inner.txt", "x");
    fx.index();

    let outcome = search::perform_search(&fx.db, None, Some(QueryMode::Search), &SearchFilters::default())
        .unwrap();

    assert!(outcome.rows.iter().any(|e| e.entry_type == EntryType::Dir));
    assert!(outcome.rows.iter().any(|e| e.name == "inner.txt"));
}

#[test]
fn test_trailing_separator_lists_files_only() {
    let fx = Fixture::new();
    fx.file("sub/one.txt", "1");
    fx.file("sub/deeper/two.txt", "2");
    fx.file("outside.txt", "3");
    fx.index();

    let target = with_dir_separator(&fx.root.join("sub"));
    let outcome = search::perform_search(&fx.db, Some(target.as_path()), None, &SearchFilters::default()).unwrap();

    assert_eq!(outcome.mode, QueryMode::List);
    let mut names: Vec<_> = outcome.rows.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["one.txt", "two.txt"]);
}

#[test]
fn test_reindex_keeps_one_row_per_path() {
    let fx = Fixture::new();
    fx.file("a.txt", "a");
    fx.file("b.txt", "b");
    fx.index();
    let first = fx.db.count().unwrap();

    fx.index();
    fx.index();

    assert_eq!(fx.db.count().unwrap(), first);
}

#[test]
fn test_touch_updates_store_within_tolerance() {
    let fx = Fixture::new();
    let path = fx.file("old.txt", "old");
    filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(1_000_000_000, 0)).unwrap();
    fx.index();

    let rows = vec![fx.db.get_by_path(&path).unwrap().unwrap()];
    let before = now_ms();
    let report = wri::apply(&fx.db, &rows, &Operation::Touch).unwrap();

    assert_eq!(report.summary().success, 1);
    let entry = fx.db.get_by_path(&path).unwrap().unwrap();
    assert!((entry.mtime_ms - before).abs() < 2_000);
}

#[test]
fn test_rename_replaces_row() {
    let fx = Fixture::new();
    let path = fx.file("todo.txt", "list");
    fx.index();

    let mut directive = WriDirective::new(WriOp::Rename);
    directive.new_name = Some("notes.md".into());
    let op = Operation::try_from(&directive).unwrap();
    let rows = vec![fx.db.get_by_path(&path).unwrap().unwrap()];

    let report = wri::apply(&fx.db, &rows, &op).unwrap();

    assert!(report.results()[0].is_ok());
    let renamed = fx.root.join("notes.md");
    assert!(renamed.exists());
    assert!(fx.db.get_by_path(&path).unwrap().is_none());
    let entry = fx.db.get_by_path(&renamed).unwrap().unwrap();
    assert_eq!(entry.ext, ".md");
}

#[test]
fn test_batch_continues_past_missing_file() {
    let fx = Fixture::new();
    let a = fx.file("a.txt", "a");
    let gone = fx.file("gone.txt", "g");
    let c = fx.file("c.txt", "c");
    fx.index();
    fs::remove_file(&gone).unwrap();

    let rows: Vec<_> = [&a, &gone, &c]
        .iter()
        .map(|p| fx.db.get_by_path(p).unwrap().unwrap())
        .collect();
    let report = wri::apply(&fx.db, &rows, &Operation::Touch).unwrap();

    let BatchReport::Completed(results) = &report else {
        panic!("expected completed batch");
    };
    assert_eq!(results.len(), 3);
    let summary = report.summary();
    assert_eq!(summary.success, 2);
    assert_eq!(summary.errors, 1);
    assert!(!results[1].is_ok());
}

#[test]
fn test_empty_target_set_is_no_match() {
    let fx = Fixture::new();
    let report = wri::apply(&fx.db, &[], &Operation::Touch).unwrap();
    assert_eq!(report, BatchReport::NoMatch);
}

#[test]
fn test_time_expressions() {
    assert_eq!(parse_delta("+1h30m").unwrap(), 5_400_000);
    assert_eq!(parse_delta("-45s").unwrap(), -45_000);
    assert_eq!(parse_delta("").unwrap(), 0);
    assert!(parse_delta("1x").is_err());

    let from = parse_absolute("2024-10-01", Bound::From).unwrap();
    let to = parse_absolute("2024-10-01", Bound::To).unwrap();
    assert_eq!(to - from, 86_399_999);
    assert!(parse_absolute("not a date", Bound::From).is_err());
}
