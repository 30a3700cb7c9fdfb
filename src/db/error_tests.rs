//! Unit tests for database error types

#[cfg(test)]
mod tests {
    use crate::db::error::DbError;
    use std::error::Error;

    #[test]
    fn test_schema_migration_error() {
        let error = DbError::SchemaMigration("no such table".to_string());
        assert_eq!(error.to_string(), "Schema migration failed: no such table");
    }

    #[test]
    fn test_serialize_error() {
        let error = DbError::SerializeError("Invalid UTF-8".to_string());
        assert_eq!(error.to_string(), "Error during serialization: Invalid UTF-8");
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let error: DbError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(error, DbError::SqliteError(_)));
        assert!(error.to_string().starts_with("Database error:"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_error_debug() {
        let error = DbError::InvalidValue("size -1".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidValue"));
        assert!(debug.contains("size -1"));
    }

    #[test]
    fn test_error_source_is_none_for_messages() {
        let error = DbError::SerializeError("x".to_string());
        assert!(error.source().is_none());
    }
}
