//! Info command - report where the store lives and what it holds

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{MetanyxError, config::OutputFormat, db::Database, meta, output};

type Result<T> = std::result::Result<T, MetanyxError>;

/// Actions the binary understands, in display order
pub const ACTIONS: &[&str] = &["read", "view", "wri", "clear", "info", "completions"];

/// Store and environment facts shown by `info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreInfo {
    pub cwd: PathBuf,
    pub db_path: PathBuf,
    pub db_exists: bool,
    pub db_size: Option<u64>,
    pub entries: u64,
    pub version: &'static str,
    pub actions: Vec<&'static str>,
}

/// Collect [`StoreInfo`] for the store at `db_path`
///
/// A missing store is reported as such and is not created.
///
/// # Errors
///
/// Returns `MetanyxError` if the working directory is unavailable or an
/// existing store cannot be opened.
pub fn gather(db_path: &Path) -> Result<StoreInfo> {
    let db_path = meta::normalize_absolute(db_path)?;
    let size = fs::metadata(&db_path).ok().map(|md| md.len());
    let entries = match size {
        Some(_) => {
            let db = Database::open(&db_path)?;
            let count = db.count()?;
            db.close()?;
            count
        }
        None => 0,
    };
    Ok(StoreInfo {
        cwd: std::env::current_dir()?,
        db_exists: size.is_some(),
        db_path,
        db_size: size,
        entries,
        version: env!("CARGO_PKG_VERSION"),
        actions: ACTIONS.to_vec(),
    })
}

/// Execute the info command
///
/// # Errors
///
/// Returns `MetanyxError` if gathering or rendering fails.
pub fn execute(db_path: &Path, format: OutputFormat) -> Result<()> {
    let info = gather(db_path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::Table => {
            let rows = vec![
                vec!["CWD".to_string(), info.cwd.display().to_string()],
                vec!["DBPath".to_string(), info.db_path.display().to_string()],
                vec![
                    "DBExists".to_string(),
                    if info.db_exists { "yes" } else { "no" }.to_string(),
                ],
                vec![
                    "DBSize".to_string(),
                    info.db_size.map(output::format_size).unwrap_or_default(),
                ],
                vec!["DBEntries".to_string(), info.entries.to_string()],
                vec!["Version".to_string(), info.version.to_string()],
                vec!["Actions".to_string(), info.actions.join(", ")],
            ];
            print!("{}", output::render_table(&["Key", "Value"], &rows));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::EntryType;
    use crate::testing::{TempTree, sample_entry};

    #[test]
    fn test_info_missing_store_is_not_created() {
        let tree = TempTree::new();
        let path = tree.root().join("absent.db");

        let info = gather(&path).unwrap();

        assert!(!info.db_exists);
        assert_eq!(info.entries, 0);
        assert_eq!(info.db_size, None);
        assert!(!path.exists());
    }

    #[test]
    fn test_info_counts_entries() {
        let tree = TempTree::new();
        let path = tree.root().join("store.db");
        {
            let db = Database::open(&path).unwrap();
            db.upsert(&sample_entry("/x/a.txt", EntryType::File)).unwrap();
        }

        let info = gather(&path).unwrap();

        assert!(info.db_exists);
        assert_eq!(info.entries, 1);
        assert!(info.db_size.unwrap() > 0);
        assert!(info.actions.contains(&"wri"));
    }
}
