//! Index store for metanyx
//!
//! A single SQLite table, `entries`, holds one row per indexed path with a
//! unique index on `full_path`. Writes are whole-record upserts: re-indexing
//! a path overwrites every column, there is no history.
//!
//! One [`Database`] owns one connection. It is opened per invocation, used
//! sequentially, and closed when dropped (or explicitly via [`Database::close`]).

use crate::meta::{Entry, EntryType};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter, types::Type};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod error;
pub mod query;
pub mod types;

pub use error::DbError;
pub use query::SearchFilters;
pub use types::{DirPrefix, PathString};

use query::{ENTRY_COLUMNS, build_search, path_param};

type Result<T> = std::result::Result<T, DbError>;

const CREATE_SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS entries (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  full_path TEXT NOT NULL,
  name TEXT NOT NULL,
  type TEXT NOT NULL,
  size INTEGER NOT NULL,
  mtime_ms INTEGER NOT NULL,
  ctime_ms INTEGER NOT NULL,
  atime_ms INTEGER,
  mode INTEGER NOT NULL,
  ext TEXT,
  hash TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_full_path ON entries(full_path);
";

const UPSERT_SQL: &str = "
INSERT INTO entries (full_path, name, type, size, mtime_ms, ctime_ms, atime_ms, mode, ext, hash)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
ON CONFLICT(full_path) DO UPDATE SET
  name = excluded.name,
  type = excluded.type,
  size = excluded.size,
  mtime_ms = excluded.mtime_ms,
  ctime_ms = excluded.ctime_ms,
  atime_ms = excluded.atime_ms,
  mode = excluded.mode,
  ext = excluded.ext,
  hash = excluded.hash
";

/// Row counts around a [`Database::clear`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearReport {
    pub before: u64,
    pub after: u64,
}

/// Handle to the index store
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Opens or creates the store at `path`, creating and migrating the schema
    ///
    /// Safe to call on an existing store; schema creation is idempotent.
    ///
    /// # Examples
    /// ```no_run
    /// use metanyx::db::Database;
    /// let db = Database::open("metanyx.db").unwrap();
    /// println!("{} entries", db.count().unwrap());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError::SqliteError` if the file cannot be opened, or
    /// `DbError::SchemaMigration` if the schema cannot be created or upgraded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        debug!(path = %path.display(), "opened index store");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens a private in-memory store
    ///
    /// # Errors
    ///
    /// Returns `DbError` if SQLite cannot allocate the database or the schema fails.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Location of the store file, `None` for in-memory stores
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert `entry`, or overwrite every column of the existing row with the same `full_path`
    ///
    /// Idempotent: repeating the call with the same entry leaves one identical row.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the path is not valid UTF-8, the size exceeds
    /// SQLite's integer range, or the write fails.
    pub fn upsert(&self, entry: &Entry) -> Result<()> {
        let full_path = write_entry(&self.conn, entry)?;
        debug!(path = %full_path, "upserted entry");
        Ok(())
    }

    /// Total number of rows
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the query fails.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| DbError::InvalidValue(format!("row count {count}")))
    }

    /// Exact lookup by `full_path`; `Ok(None)` when the path is not indexed
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the path is not valid UTF-8 or the query fails.
    pub fn get_by_path<P: AsRef<Path>>(&self, path: P) -> Result<Option<Entry>> {
        let key = path_param(path)?;
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE full_path = ?1");
        Ok(self.conn.query_row(&sql, [key], entry_from_row).optional()?)
    }

    /// Every row strictly below `dir`, ordered by `full_path`
    ///
    /// Directory rows are included. List mode, which only ever shows files,
    /// goes through [`crate::search::perform_search`] and
    /// [`crate::search::file_rows`]; do not use this directly where a file-only
    /// result is expected.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if `dir` is not valid UTF-8 or the query fails.
    pub fn list_under<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<Entry>> {
        let prefix = DirPrefix::new(dir)?;
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries \
             WHERE substr(full_path, 1, length(?1)) = ?1 ORDER BY full_path"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([&*prefix], entry_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Rows matching every supplied filter, ordered by `full_path`
    ///
    /// No defaults are applied here: an empty filter set returns every row,
    /// directories included.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if a filter cannot be bound or the query fails.
    pub fn search(&self, filters: &SearchFilters) -> Result<Vec<Entry>> {
        let (sql, values) = build_search(filters)?;
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), entry_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Move the row for `old` to `entry.full_path` in one transaction
    ///
    /// The old row is deleted and `entry` upserted together, so after a commit
    /// or a failure exactly one of the two paths is indexed. Used after a
    /// successful rename, once the destination has been re-extracted.
    ///
    /// # Returns
    /// `true` if a row existed at `old`
    ///
    /// # Errors
    ///
    /// Returns `DbError` if either path is not valid UTF-8 or a statement fails;
    /// the transaction is rolled back in that case.
    pub fn replace_path<P: AsRef<Path>>(&self, old: P, entry: &Entry) -> Result<bool> {
        let key = path_param(old)?;
        let tx = self.conn.unchecked_transaction()?;
        let deleted = tx.execute("DELETE FROM entries WHERE full_path = ?1", [&key])?;
        let new_key = write_entry(&tx, entry)?;
        tx.commit()?;
        debug!(from = %key, to = %new_key, "moved entry");
        Ok(deleted > 0)
    }

    /// Delete all rows
    ///
    /// # Warning
    /// This operation is irreversible!
    ///
    /// # Errors
    ///
    /// Returns `DbError` if counting or deleting fails.
    pub fn clear(&self) -> Result<ClearReport> {
        let before = self.count()?;
        self.conn.execute("DELETE FROM entries", [])?;
        let after = self.count()?;
        info!(before, after, "cleared entries");
        Ok(ClearReport { before, after })
    }

    /// Close the connection, surfacing any error instead of ignoring it on drop
    ///
    /// # Errors
    ///
    /// Returns `DbError` if SQLite reports an error while closing.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| DbError::SqliteError(e))
    }
}

/// Create the table and index, then add columns missing from older stores
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_SCHEMA_SQL)
        .map_err(|e| DbError::SchemaMigration(format!("creating schema: {e}")))?;

    let has_atime: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('entries') WHERE name = 'atime_ms'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count > 0)
        .map_err(|e| DbError::SchemaMigration(format!("inspecting schema: {e}")))?;

    if !has_atime {
        conn.execute("ALTER TABLE entries ADD COLUMN atime_ms INTEGER", [])
            .map_err(|e| DbError::SchemaMigration(format!("adding atime_ms: {e}")))?;
        info!("migrated entries table: added atime_ms column");
    }
    Ok(())
}

/// Run the upsert statement for `entry` on `conn`, returning the bound path
fn write_entry(conn: &Connection, entry: &Entry) -> Result<String> {
    let full_path = path_param(&entry.full_path)?;
    let size = i64::try_from(entry.size)
        .map_err(|_| DbError::InvalidValue(format!("size {} of {full_path}", entry.size)))?;

    conn.execute(
        UPSERT_SQL,
        params![
            full_path,
            entry.name,
            entry.entry_type.as_str(),
            size,
            entry.mtime_ms,
            entry.ctime_ms,
            entry.atime_ms,
            entry.mode,
            entry.ext,
            entry.hash,
        ],
    )?;
    Ok(full_path)
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let type_str: String = row.get(2)?;
    let entry_type: EntryType = type_str
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    let size: i64 = row.get(3)?;
    let size = u64::try_from(size).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(3, size))?;

    let full_path: String = row.get(0)?;
    let ext: Option<String> = row.get(8)?;

    Ok(Entry {
        full_path: PathBuf::from(full_path),
        name: row.get(1)?,
        entry_type,
        size,
        mtime_ms: row.get(4)?,
        ctime_ms: row.get(5)?,
        atime_ms: row.get(6)?,
        mode: row.get(7)?,
        ext: ext.unwrap_or_default(),
        hash: row.get(9)?,
    })
}
