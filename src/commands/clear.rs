//! Clear command - delete every row from the store

use serde_json::json;

use crate::{MetanyxError, config::OutputFormat, db::Database};

type Result<T> = std::result::Result<T, MetanyxError>;

/// Execute the clear command
///
/// # Errors
///
/// Returns `MetanyxError` if the delete fails.
pub fn execute(db: &Database, format: OutputFormat, quiet: bool) -> Result<()> {
    let report = db.clear()?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "before": report.before, "after": report.after }))?
        ),
        OutputFormat::Table if !quiet => println!(
            "Cleared entries (before: {}, after: {})",
            report.before, report.after
        ),
        OutputFormat::Table => {}
    }
    Ok(())
}
