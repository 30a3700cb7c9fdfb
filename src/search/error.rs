//! Resolver error types
//!
//! - **`MissingTarget`**: `single` mode was requested without a target path
//! - **`MissingUnder`**: `list` mode had neither a target path nor an `under` filter
//! - **`DatabaseError`**: the store query itself failed (wraps `DbError`)

use thiserror::Error;

/// Filter/mode resolution errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// Exact lookup needs a path
    #[error("Mode 'single' requires a target path")]
    MissingTarget,

    /// Directory listing needs a directory
    #[error("Mode 'list' requires a target path or an 'under' filter")]
    MissingUnder,

    /// Database error occurred during search
    #[error("Database error: {0}")]
    DatabaseError(#[from] crate::db::DbError),

    /// A relative path could not be made absolute
    #[error("Cannot resolve path: {0}")]
    ResolveError(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
