//! Mutation executor error types
//!
//! Only failures that stop the whole batch live here. A filesystem call that
//! fails for one target is recorded in that target's
//! [`OpStatus`](super::OpStatus) instead.

use super::core::WriOp;
use crate::db::DbError;
use crate::search::SearchError;
use crate::timeexpr::TimeParseError;
use thiserror::Error;

/// Fatal mutation errors
#[derive(Debug, Error)]
pub enum WriError {
    /// The operation lacks the extra it cannot run without
    #[error("Operation '{op}' requires {what}")]
    MissingDirective { op: WriOp, what: &'static str },

    /// The extra is present but unusable
    #[error("Invalid directive: {0}")]
    InvalidDirective(String),

    /// A delta expression failed to parse
    #[error("Invalid time expression: {0}")]
    TimeExpression(#[from] TimeParseError),

    /// Re-syncing the store after a mutation failed
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbError),

    /// Resolving the target set failed
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),
}
