//! Read command - index a file or a directory tree into the store

use std::path::Path;
use tracing::{info, warn};

use crate::{
    MetanyxError,
    config::OutputFormat,
    db::Database,
    meta::{self, Entry, Scanner},
    output,
};

type Result<T> = std::result::Result<T, MetanyxError>;

/// Options for one `read` invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Empty the table before indexing
    pub clear: bool,
    /// Store only `type=file` records
    pub files_only: bool,
    /// Log and skip children that cannot be listed or stat'ed
    pub keep_going: bool,
}

/// What an indexing run wrote
#[derive(Debug, Default)]
pub struct ReadReport {
    pub written: Vec<Entry>,
    pub skipped: usize,
}

/// Index `target` without printing anything
///
/// A directory is walked (the directory itself is not recorded, only what is
/// below it); anything else is extracted on its own. Every record is upserted
/// as soon as it is produced.
///
/// # Errors
///
/// Returns `MetaError::PathNotFound` if `target` does not exist, a walk error
/// unless `keep_going` is set, or `DbError` if a write fails.
pub fn index_path(db: &Database, target: &Path, opts: ReadOptions) -> Result<ReadReport> {
    let abs = meta::normalize_absolute(target)?;
    let stat = meta::stat_path(&abs)?;

    if opts.clear {
        let cleared = db.clear()?;
        info!(removed = cleared.before, "cleared store before indexing");
    }

    let mut report = ReadReport::default();
    let mut store = |entry: Entry| -> Result<()> {
        if opts.files_only && !entry.is_file() {
            return Ok(());
        }
        db.upsert(&entry)?;
        report.written.push(entry);
        Ok(())
    };

    if stat.is_dir {
        if opts.keep_going {
            let mut skipped = 0;
            for record in Scanner::new(&abs) {
                match record {
                    Ok(entry) => store(entry)?,
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable entry");
                        skipped += 1;
                    }
                }
            }
            report.skipped = skipped;
        } else {
            meta::scan_dir::<_, MetanyxError>(&abs, &mut store)?;
        }
    } else {
        store(meta::read_meta(&abs, &stat))?;
    }

    info!(
        target = %abs.display(),
        written = report.written.len(),
        skipped = report.skipped,
        "indexing finished"
    );
    Ok(report)
}

/// Execute the read command
///
/// # Errors
///
/// Returns `MetanyxError` if indexing fails or the output cannot be rendered.
pub fn execute(
    db: &Database,
    target: &Path,
    opts: ReadOptions,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let report = index_path(db, target, opts)?;

    if !quiet && format == OutputFormat::Table {
        println!("Indexed {} entries", report.written.len());
        if report.skipped > 0 {
            println!("Skipped {} unreadable entries", report.skipped);
        }
    }
    output::print_entries(&report.written, &[], format)
}
