//! Wri command: batch metadata mutation
//!
//! - `core`: directive, operation and result types, summary, confirmation & preview helpers
//! - `ops`: the filesystem call behind each operation
//! - `ctime`: change-time refresh through a rename round trip
//! - `executor`: sequential mutate, re-extract, upsert loop
//! - `error`: fatal errors (per-target failures are data, not errors)

mod core;
mod ctime;
mod error;
mod executor;
mod ops;

pub use self::core::{
    BatchReport, BatchSummary, MAX_MODE, OpOutcome, OpResult, OpStatus, Operation, WriDirective,
    WriOp,
};
pub use self::ctime::{CtimeError, refresh_ctime};
pub use self::error::WriError;
pub use self::executor::apply;

use std::path::Path;
use tracing::info;

use crate::config::OutputFormat;
use crate::db::{Database, SearchFilters};
use crate::search::{self, QueryMode};
use crate::{MetanyxError, output};

type Result<T> = std::result::Result<T, MetanyxError>;

/// Target selection and safety switches for one `wri` invocation
#[derive(Debug, Clone, Copy)]
pub struct WriArgs<'a> {
    pub target: Option<&'a Path>,
    pub mode: Option<QueryMode>,
    pub filters: &'a SearchFilters,
    pub directive: &'a WriDirective,
    pub dry_run: bool,
    pub yes: bool,
}

/// Execute the wri command
///
/// The directive is validated before anything is queried, so a missing or
/// malformed extra fails without side effects. Only `type=file` rows are
/// mutated.
///
/// # Errors
///
/// Returns `MetanyxError` if the directive is invalid, the target set cannot be
/// resolved, confirmation fails, or the store cannot be re-synced.
pub fn execute(db: &Database, args: &WriArgs<'_>, format: OutputFormat, quiet: bool) -> Result<()> {
    let op = Operation::try_from(args.directive)?;
    let outcome = search::perform_search(db, args.target, args.mode, args.filters)
        .map_err(WriError::from)?;
    let rows = search::file_rows(outcome.rows);
    info!(op = %op.op(), mode = %outcome.mode, matched = rows.len(), "resolved wri targets");

    if rows.is_empty() {
        output::print_batch_report(&BatchReport::NoMatch, format)?;
        return Ok(());
    }

    let files: Vec<&Path> = rows.iter().map(|e| e.full_path.as_path()).collect();
    if args.dry_run {
        self::core::print_dry_run_preview(&files, &op);
        return Ok(());
    }
    if !args.yes && !self::core::confirm_operation(&files, &op)? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let report = apply(db, &rows, &op)?;
    output::print_batch_report(&report, format)?;
    if !quiet && format == OutputFormat::Table {
        report.summary().print(&format!("{} Files", op.op().as_str().to_uppercase()));
    }
    Ok(())
}
