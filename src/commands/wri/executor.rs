use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::core::{BatchReport, OpOutcome, OpResult, OpStatus, Operation};
use super::ctime::refresh_ctime;
use super::error::WriError;
use super::ops;
use crate::db::Database;
use crate::meta::{self, Entry, MetaError};

type Result<T> = std::result::Result<T, WriError>;

/// Where a target ended up after its filesystem mutation
struct Mutated {
    path: PathBuf,
    renamed_from: Option<PathBuf>,
    ctime_refreshed: bool,
}

impl Mutated {
    fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            renamed_from: None,
            ctime_refreshed: false,
        }
    }

    fn moved(&mut self, from: &Path, to: PathBuf) {
        self.renamed_from = Some(from.to_path_buf());
        self.path = to;
    }
}

/// How far one target's filesystem steps got
enum Mutation {
    /// Every step succeeded
    Done(Mutated),
    /// Nothing on disk changed
    Failed(io::Error),
    /// Earlier steps reached the disk before a later one failed
    Partial(Mutated, String),
}

fn mutate(path: &Path, op: &Operation) -> Mutation {
    let mut mutated = Mutated::at(path);
    let step = match op {
        Operation::Touch => ops::touch(path),
        Operation::Time {
            mtime_delta,
            atime_delta,
            ctime_touch,
        } => {
            if let Err(e) = ops::shift_times(path, *mtime_delta, *atime_delta) {
                return Mutation::Failed(e);
            }
            if *ctime_touch {
                match refresh_ctime(path) {
                    Ok(()) => mutated.ctime_refreshed = true,
                    Err(e) => {
                        if let Some(left_at) = e.left_at() {
                            mutated.moved(path, left_at.to_path_buf());
                        }
                        return Mutation::Partial(mutated, e.to_string());
                    }
                }
            }
            Ok(())
        }
        Operation::Chmod { mode } => ops::chmod(path, *mode),
        Operation::Rename { new_name } => ops::rename_in_place(path, new_name).map(|dest| {
            if dest != path {
                mutated.moved(path, dest);
            }
        }),
    };
    match step {
        Ok(()) => Mutation::Done(mutated),
        Err(e) => Mutation::Failed(e),
    }
}

fn outcome_for(op: &Operation, entry: &Entry, mutated: Mutated) -> OpOutcome {
    match op {
        Operation::Touch => OpOutcome::Touched {
            atime_ms: entry.atime_ms,
            mtime_ms: entry.mtime_ms,
            ctime_ms: entry.ctime_ms,
        },
        Operation::Time { .. } => OpOutcome::TimesSet {
            atime_ms: entry.atime_ms,
            mtime_ms: entry.mtime_ms,
            ctime_ms: entry.ctime_ms,
            ctime_refreshed: mutated.ctime_refreshed,
        },
        Operation::Chmod { .. } => OpOutcome::ModeSet {
            mode: entry.mode & 0o7777,
        },
        Operation::Rename { .. } => OpOutcome::Renamed {
            from: mutated.renamed_from.unwrap_or_else(|| mutated.path.clone()),
            to: mutated.path,
        },
    }
}

/// Bring the store in line with the filesystem after a mutation
///
/// The path the file now lives at is re-extracted first. For a move, the old
/// row is then replaced in one transaction; if extraction fails the store is
/// left untouched.
///
/// # Errors
///
/// The outer result is a store write failure; the inner one a failed re-extract.
fn resync(db: &Database, mutated: &Mutated) -> Result<std::result::Result<Entry, MetaError>> {
    let entry = match meta::extract(&mutated.path) {
        Ok(entry) => entry,
        Err(e) => {
            warn!(path = %mutated.path.display(), error = %e, "re-extract after mutation failed");
            return Ok(Err(e));
        }
    };
    match &mutated.renamed_from {
        Some(old) => {
            db.replace_path(old, &entry)?;
        }
        None => db.upsert(&entry)?,
    }
    debug!(path = %entry.full_path.display(), "re-synced entry");
    Ok(Ok(entry))
}

/// Run `op` on every file row of `rows`, one at a time and in order
///
/// Each target is mutated, re-stat'ed and upserted before the next one starts.
/// Directory rows are skipped. Filesystem failures are recorded against their
/// target and the batch continues; an empty target set yields
/// [`BatchReport::NoMatch`]. A target whose steps only partly reached the disk
/// is re-synced wherever it now lives and still reported as an error.
///
/// # Errors
///
/// Returns `WriError::DatabaseError` if writing a re-synced row fails. Results
/// for targets processed before the failure are lost, but each of them was
/// already fully re-synced.
pub fn apply(db: &Database, rows: &[Entry], op: &Operation) -> Result<BatchReport> {
    let targets: Vec<&Path> = rows
        .iter()
        .filter(|e| e.is_file())
        .map(|e| e.full_path.as_path())
        .collect();
    if targets.is_empty() {
        info!(op = %op.op(), "no matching files");
        return Ok(BatchReport::NoMatch);
    }

    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let status = match mutate(target, op) {
            Mutation::Done(mutated) => match resync(db, &mutated)? {
                Ok(entry) => OpStatus::Outcome(outcome_for(op, &entry, mutated)),
                Err(e) => OpStatus::Error(format!("mutation applied but re-sync failed: {e}")),
            },
            Mutation::Partial(mutated, reason) => {
                warn!(path = %target.display(), op = %op.op(), error = %reason, "mutation partly applied");
                match resync(db, &mutated)? {
                    Ok(_) => OpStatus::Error(reason),
                    Err(e) => OpStatus::Error(format!("{reason}; re-sync failed: {e}")),
                }
            }
            Mutation::Failed(e) => {
                warn!(path = %target.display(), op = %op.op(), error = %e, "mutation failed");
                OpStatus::Error(e.to_string())
            }
        };
        results.push(OpResult {
            op: op.op(),
            target: target.to_path_buf(),
            status,
        });
    }

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    info!(op = %op.op(), total = results.len(), failed, "batch finished");
    Ok(BatchReport::Completed(results))
}
