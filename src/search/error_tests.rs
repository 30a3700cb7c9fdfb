//! Unit tests for search error types

#[cfg(test)]
mod tests {
    use crate::db::error::DbError;
    use crate::search::error::SearchError;
    use std::error::Error;

    #[test]
    fn test_missing_target_error() {
        let error = SearchError::MissingTarget;
        assert_eq!(error.to_string(), "Mode 'single' requires a target path");
    }

    #[test]
    fn test_missing_under_error() {
        let error = SearchError::MissingUnder;
        assert!(error.to_string().contains("'under' filter"));
    }

    #[test]
    fn test_database_error_from_db_error() {
        let db_error = DbError::SchemaMigration("locked".to_string());
        let search_error: SearchError = db_error.into();

        assert!(search_error.to_string().contains("Database error"));
        assert!(search_error.source().is_some());
    }

    #[test]
    fn test_error_debug() {
        let error = SearchError::MissingUnder;
        let debug = format!("{error:?}");
        assert!(debug.contains("MissingUnder"));
    }
}
