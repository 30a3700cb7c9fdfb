//! View command - query the store and render matching entries

use std::path::Path;

use crate::{
    MetanyxError,
    config::OutputFormat,
    db::{Database, SearchFilters},
    output,
    search::{self, QueryMode},
};

type Result<T> = std::result::Result<T, MetanyxError>;

/// Execute the view command
///
/// # Arguments
/// * `target` - Optional path; a trailing separator selects list mode
/// * `mode` - Explicit query mode
/// * `filters` - Search filters
/// * `fields` - Columns to show; empty shows the default set
///
/// # Errors
///
/// Returns `MetanyxError` if a field name is unknown, the query fails, or the
/// output cannot be rendered.
pub fn execute(
    db: &Database,
    target: Option<&Path>,
    mode: Option<QueryMode>,
    filters: &SearchFilters,
    fields: &[String],
    format: OutputFormat,
) -> Result<()> {
    output::validate_fields(fields)?;
    let outcome = search::perform_search(db, target, mode, filters)?;
    tracing::info!(mode = %outcome.mode, rows = outcome.rows.len(), "view query finished");
    output::print_entries(&outcome.rows, fields, format)
}
