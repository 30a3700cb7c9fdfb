//! Database-specific error types
//!
//! This module defines all error types that can occur during index store operations.
//!
//! # Error Types
//!
//! - **`SqliteError`**: Errors from the underlying SQLite connection
//! - **`SchemaMigration`**: The store could not be created or upgraded on open
//! - **`SerializeError`**: A path could not be represented as a TEXT column (invalid UTF-8)
//! - **`InvalidValue`**: A stored value is out of range for its Rust type
//!
//! All errors implement `std::error::Error` via the `thiserror` crate.

use thiserror::Error;

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Represents a SQLite error
    #[error("Database error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// Schema creation or forward migration failed while opening the store
    #[error("Schema migration failed: {0}")]
    SchemaMigration(String),

    /// Generic serialization error (e.g., invalid UTF-8 in paths)
    #[error("Error during serialization: {0}")]
    SerializeError(String),

    /// A stored column holds a value the entry type cannot represent
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
