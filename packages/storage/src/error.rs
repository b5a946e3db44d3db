// ABOUTME: Storage error taxonomy shared by every Sentinel storage package
// ABOUTME: Classifies sqlx failures into conflict, reference and persistence errors

use sentinel_core::ValidationError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// SQLite primary result codes that indicate lock contention
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Conflict while {operation}: {message}")]
    Conflict { operation: String, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Missing reference while {operation}: {message}")]
    Reference { operation: String, message: String },
    #[error("Database error while {operation}: {source}")]
    Persistence {
        operation: String,
        source: sqlx::Error,
    },
    #[error("Invalid value stored in {column}: {value}")]
    Corrupt { column: &'static str, value: String },
    #[error("Configuration error: {0}")]
    Config(#[from] sentinel_config::ConfigError),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Classify a sqlx error raised while performing `operation`
    pub fn from_sqlx(operation: impl Into<String>, err: sqlx::Error) -> Self {
        let operation = operation.into();
        match err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => StorageError::Conflict {
                    operation,
                    message: db_err.message().to_string(),
                },
                ErrorKind::ForeignKeyViolation => StorageError::Reference {
                    operation,
                    message: db_err.message().to_string(),
                },
                _ => StorageError::Persistence {
                    operation,
                    source: sqlx::Error::Database(db_err),
                },
            },
            other => StorageError::Persistence {
                operation,
                source: other,
            },
        }
    }

    /// Whether repeating the whole operation may succeed.
    ///
    /// Conflicts are retried as look-ups; busy/locked errors come from
    /// concurrent SQLite writers.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::Conflict { .. } => true,
            StorageError::Persistence { source, .. } => is_contention(source),
            _ => false,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::from_sqlx("executing query", err)
    }
}

fn is_contention(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            // Extended result codes carry the primary code in the low byte
            .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
            .unwrap_or(false),
        _ => false,
    }
}

/// Attach the failing step to a sqlx result
pub trait SqlxResultExt<T> {
    fn context(self, operation: &str) -> StorageResult<T>;
}

impl<T> SqlxResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, operation: &str) -> StorageResult<T> {
        self.map_err(|err| StorageError::from_sqlx(operation, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_persistence() {
        let err = StorageError::from_sqlx("loading tool", sqlx::Error::RowNotFound);
        match &err {
            StorageError::Persistence { operation, .. } => assert_eq!(operation, "loading tool"),
            other => panic!("Expected Persistence error, got {:?}", other),
        }
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_pool_timeout_is_retryable() {
        let err = StorageError::from_sqlx("acquiring connection", sqlx::Error::PoolTimedOut);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_conflict_is_retryable() {
        let err = StorageError::Conflict {
            operation: "inserting tool".to_string(),
            message: "UNIQUE constraint failed".to_string(),
        };
        assert!(err.is_retryable());
        assert!(err.is_conflict());
        assert!(!StorageError::NotFound("review".to_string()).is_retryable());
    }

    #[test]
    fn test_validation_is_not_retryable() {
        let err: StorageError = ValidationError::EmptyField("name").into();
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Validation error: name is required");
    }
}
