//! Output formatting for CLI display
//!
//! Entries and mutation results render either as an aligned table or as
//! pretty-printed JSON. Entry JSON carries the stored fields plus derived
//! `*_human` timestamps, optionally narrowed to a caller-chosen field list.

use crate::MetanyxError;
use crate::commands::wri::{BatchReport, OpStatus};
use crate::config::OutputFormat;
use crate::meta::Entry;
use byte_unit::{Byte, UnitType};
use chrono::{Local, TimeZone};
use colored::Colorize;
use serde_json::{Map, Value, json};

/// Every field name `--fields` accepts, stored columns first
pub const ENTRY_FIELDS: &[&str] = &[
    "full_path",
    "name",
    "type",
    "size",
    "mtime_ms",
    "ctime_ms",
    "atime_ms",
    "mode",
    "ext",
    "hash",
    "mtime_human",
    "ctime_human",
    "atime_human",
];

/// Default table layout: header and the field it shows
const DEFAULT_COLUMNS: &[(&str, &str)] = &[
    ("Name", "name"),
    ("Type", "type"),
    ("Size", "size"),
    ("Ext", "ext"),
    ("MTime", "mtime_human"),
    ("CTime", "ctime_human"),
    ("ATime", "atime_human"),
    ("Path", "full_path"),
];

const MAX_CELL_WIDTH: usize = 60;

/// Local `YYYY-MM-DD HH:MM:SS` for an epoch-millisecond timestamp
#[must_use]
pub fn format_timestamp(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map_or_else(|| ms.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Human-readable binary size (`1.5 KiB`)
#[must_use]
pub fn format_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

/// Shorten `text` to `max` characters, marking the cut with `…`
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Check a `--fields` list against [`ENTRY_FIELDS`]
///
/// # Errors
///
/// Returns `MetanyxError::InvalidInput` naming the first unknown field.
pub fn validate_fields(fields: &[String]) -> Result<(), MetanyxError> {
    match fields.iter().find(|f| !ENTRY_FIELDS.contains(&f.as_str())) {
        Some(unknown) => Err(MetanyxError::InvalidInput(format!(
            "Unknown field '{unknown}' (available: {})",
            ENTRY_FIELDS.join(", ")
        ))),
        None => Ok(()),
    }
}

/// JSON object for `entry`, with derived fields, narrowed to `fields` when non-empty
///
/// # Errors
///
/// Returns `serde_json::Error` if the entry cannot be serialized.
pub fn entry_to_json(entry: &Entry, fields: &[String]) -> Result<Value, serde_json::Error> {
    let mut map = match serde_json::to_value(entry)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    map.insert("mtime_human".into(), json!(format_timestamp(entry.mtime_ms)));
    map.insert("ctime_human".into(), json!(format_timestamp(entry.ctime_ms)));
    map.insert(
        "atime_human".into(),
        entry.atime_ms.map_or(Value::Null, |ms| json!(format_timestamp(ms))),
    );

    if fields.is_empty() {
        return Ok(Value::Object(map));
    }
    let picked = fields
        .iter()
        .map(|f| (f.clone(), map.get(f).cloned().unwrap_or(Value::Null)))
        .collect();
    Ok(Value::Object(picked))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Aligned table with a bold header row
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| truncate(c, MAX_CELL_WIDTH)).collect())
        .collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let pad = |text: &str, width: usize| {
        let fill = width.saturating_sub(text.chars().count());
        format!("{text}{}", " ".repeat(fill))
    };

    let mut out = String::new();
    let header: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    out.push_str(&header.join("  ").trim_end().bold().to_string());
    out.push('\n');
    for row in &rows {
        let line: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Entries as a table, using the default columns unless `fields` is set
///
/// # Errors
///
/// Returns `serde_json::Error` if an entry cannot be serialized.
pub fn render_entries_table(entries: &[Entry], fields: &[String]) -> Result<String, serde_json::Error> {
    if entries.is_empty() {
        return Ok("No records\n".to_string());
    }
    let columns: Vec<(&str, &str)> = if fields.is_empty() {
        DEFAULT_COLUMNS.to_vec()
    } else {
        fields.iter().map(|f| (f.as_str(), f.as_str())).collect()
    };

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let value = entry_to_json(entry, &[])?;
        let row = columns
            .iter()
            .map(|(_, key)| match *key {
                "size" => format_size(entry.size),
                "mode" => format!("{:o}", entry.mode),
                _ => cell(value.get(key)),
            })
            .collect();
        rows.push(row);
    }
    let headers: Vec<&str> = columns.iter().map(|(h, _)| *h).collect();
    Ok(render_table(&headers, &rows))
}

/// Print entries in the requested format
///
/// # Errors
///
/// Returns `MetanyxError::Json` if serialization fails.
pub fn print_entries(entries: &[Entry], fields: &[String], format: OutputFormat) -> Result<(), MetanyxError> {
    match format {
        OutputFormat::Json => {
            let values = entries
                .iter()
                .map(|e| entry_to_json(e, fields))
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        OutputFormat::Table => print!("{}", render_entries_table(entries, fields)?),
    }
    Ok(())
}

/// Mutation results as a table (errors in red) or a "no match" line
#[must_use]
pub fn render_batch_table(report: &BatchReport) -> String {
    if matches!(report, BatchReport::NoMatch) {
        return "No matching files\n".to_string();
    }
    let rows: Vec<Vec<String>> = report
        .results()
        .iter()
        .map(|r| {
            vec![
                r.op.to_string(),
                r.target.display().to_string(),
                match &r.status {
                    OpStatus::Outcome(outcome) => outcome.to_string(),
                    OpStatus::Error(e) => format!("ERROR: {e}"),
                },
            ]
        })
        .collect();
    let table = render_table(&["Op", "Path", "Result"], &rows);

    // Color after layout so escape codes do not skew column widths
    let mut lines = table.lines();
    let mut out = String::new();
    if let Some(header) = lines.next() {
        out.push_str(header);
        out.push('\n');
    }
    for (line, result) in lines.zip(report.results()) {
        if result.is_ok() {
            out.push_str(line);
        } else {
            out.push_str(&line.red().to_string());
        }
        out.push('\n');
    }
    out
}

/// Mutation results as JSON; a no-match batch is `{"status":"no_match"}`
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn batch_to_json(report: &BatchReport) -> Result<Value, serde_json::Error> {
    match report {
        BatchReport::NoMatch => Ok(json!({ "status": "no_match" })),
        BatchReport::Completed(results) => serde_json::to_value(results),
    }
}

/// Print mutation results in the requested format
///
/// # Errors
///
/// Returns `MetanyxError::Json` if serialization fails.
pub fn print_batch_report(report: &BatchReport, format: OutputFormat) -> Result<(), MetanyxError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&batch_to_json(report)?)?),
        OutputFormat::Table => print!("{}", render_batch_table(report)),
    }
    Ok(())
}
