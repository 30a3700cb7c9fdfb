//! Search filters and their translation to SQL
//!
//! [`SearchFilters`] is the typed filter object callers hand to the store.
//! Every supplied filter narrows the result (logical AND); absent filters
//! impose no constraint. Results are always ordered by `full_path`.

use super::DbError;
use super::types::{DirPrefix, PathString};
use crate::meta::EntryType;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Columns selected for every entry query, in [`super::Database`] row-mapping order
pub(crate) const ENTRY_COLUMNS: &str =
    "full_path, name, type, size, mtime_ms, ctime_ms, atime_ms, mode, ext, hash";

/// Filter set accepted by [`super::Database::search`]
///
/// Time bounds are epoch milliseconds and, like size bounds, inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Substring of the base name (ASCII case-insensitive)
    pub name: Option<String>,
    /// Exact extension, with or without the leading dot
    pub ext: Option<String>,
    /// Only entries strictly below this directory
    pub under: Option<PathBuf>,
    pub mtime_from: Option<i64>,
    pub mtime_to: Option<i64>,
    pub ctime_from: Option<i64>,
    pub ctime_to: Option<i64>,
    pub size_min: Option<u64>,
    pub size_max: Option<u64>,
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
}

impl SearchFilters {
    /// Whether any filter key carries a value (empty strings count as absent)
    #[must_use]
    pub fn has_any(&self) -> bool {
        let set = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.is_empty());
        set(&self.name)
            || set(&self.ext)
            || self.under.as_ref().is_some_and(|p| !p.as_os_str().is_empty())
            || self.mtime_from.is_some()
            || self.mtime_to.is_some()
            || self.ctime_from.is_some()
            || self.ctime_to.is_some()
            || self.size_min.is_some()
            || self.size_max.is_some()
            || self.entry_type.is_some()
    }

    /// Extension with a guaranteed leading dot, `None` when unset or empty
    #[must_use]
    pub fn normalized_ext(&self) -> Option<String> {
        let ext = self.ext.as_deref().filter(|e| !e.is_empty())?;
        Some(if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{ext}")
        })
    }
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn size_param(bytes: u64) -> Result<Value, DbError> {
    i64::try_from(bytes)
        .map(Value::Integer)
        .map_err(|_| DbError::InvalidValue(format!("size bound {bytes} exceeds storage range")))
}

/// Build the SELECT for `filters` along with its positional parameters
///
/// # Errors
///
/// Returns `DbError` if `under` is not valid UTF-8 or a size bound overflows.
pub(crate) fn build_search(filters: &SearchFilters) -> Result<(String, Vec<Value>), DbError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(under) = filters.under.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        let prefix = DirPrefix::new(under)?;
        clauses.push("substr(full_path, 1, length(?)) = ?");
        params.push(Value::Text(prefix.to_string()));
        params.push(Value::Text(prefix.to_string()));
    }
    if let Some(name) = filters.name.as_deref().filter(|n| !n.is_empty()) {
        clauses.push("name LIKE ? ESCAPE '\\'");
        params.push(Value::Text(format!("%{}%", escape_like(name))));
    }
    if let Some(ext) = filters.normalized_ext() {
        clauses.push("ext = ?");
        params.push(Value::Text(ext));
    }
    let bounds = [
        ("mtime_ms >= ?", filters.mtime_from),
        ("mtime_ms <= ?", filters.mtime_to),
        ("ctime_ms >= ?", filters.ctime_from),
        ("ctime_ms <= ?", filters.ctime_to),
    ];
    for (clause, bound) in bounds {
        if let Some(ms) = bound {
            clauses.push(clause);
            params.push(Value::Integer(ms));
        }
    }
    if let Some(min) = filters.size_min {
        clauses.push("size >= ?");
        params.push(size_param(min)?);
    }
    if let Some(max) = filters.size_max {
        clauses.push("size <= ?");
        params.push(size_param(max)?);
    }
    if let Some(kind) = filters.entry_type {
        clauses.push("type = ?");
        params.push(Value::Text(kind.as_str().to_string()));
    }

    let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM entries");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY full_path");
    Ok((sql, params))
}

/// Parameters for an exact-path lookup
pub(crate) fn path_param<P: AsRef<std::path::Path>>(path: P) -> Result<String, DbError> {
    Ok(PathString::new(path)?.into_string())
}
