//! Metanyx - filesystem metadata indexer
//!
//! This library indexes files and directories into a SQLite store, answers
//! filtered queries against it, and applies batch metadata changes
//! (timestamps, permissions, renames) while keeping the store in step with the
//! filesystem after every change.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod completions;
pub mod config;
pub mod db;
pub mod meta;
pub mod output;
pub mod search;
pub mod timeexpr;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum MetanyxError {
    /// Database error
    #[error("Database error: {0}")]
    DbError(#[from] db::DbError),
    /// Metadata extraction or directory walk error
    #[error("{0}")]
    MetaError(#[from] meta::MetaError),
    /// Malformed absolute or relative time expression
    #[error("{0}")]
    TimeParseError(#[from] timeexpr::TimeParseError),
    /// Search error
    #[error("Search error: {0}")]
    SearchError(#[from] search::SearchError),
    /// Batch mutation error
    #[error("{0}")]
    WriError(#[from] commands::wri::WriError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// JSON rendering error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
