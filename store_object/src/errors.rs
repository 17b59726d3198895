//! Store error taxonomy
//!
//! Driver errors are translated here and nowhere else. Code above the
//! repositories matches on these variants and never sees SQLSTATE codes.

use query_engine::QueryError;
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{table}: duplicate row")]
    Conflict { table: &'static str },

    #[error("{table}: referenced row does not exist")]
    ForeignKeyViolation { table: &'static str },

    /// Retryable: deadline elapsed, pool exhausted or connection lost
    #[error("store unavailable during {operation}: {reason}")]
    Unavailable {
        operation: &'static str,
        reason: String,
    },

    #[error("database error in {table}.{operation}: {source}")]
    Database {
        table: &'static str,
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl StoreError {
    pub fn not_found(entity: &'static str) -> Self {
        StoreError::NotFound { entity }
    }

    pub fn timed_out(operation: &'static str) -> Self {
        StoreError::Unavailable {
            operation,
            reason: "deadline elapsed".to_string(),
        }
    }

    /// Translate a driver error raised while running `operation` against `table`
    pub fn database_operation(table: &'static str, operation: &'static str, error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => return StoreError::NotFound { entity: table },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                return StoreError::Unavailable {
                    operation,
                    reason: error.to_string(),
                };
            }
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return StoreError::Conflict { table },
                Some(FOREIGN_KEY_VIOLATION) => return StoreError::ForeignKeyViolation { table },
                _ => {}
            },
            _ => {}
        }

        StoreError::Database {
            table,
            operation,
            source: error,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}
