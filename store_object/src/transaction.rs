//! Transaction wrapper for multi-statement operations

use crate::errors::StoreError;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// An open transaction. Use [`StoreTransaction::finish`] to commit on success
/// and roll back on failure in one place.
pub struct StoreTransaction {
    tx: Transaction<'static, Postgres>,
    table: &'static str,
}

impl StoreTransaction {
    pub async fn begin(pool: &PgPool, table: &'static str) -> Result<Self, StoreError> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| StoreError::database_operation(table, "begin", e))?;
        Ok(Self { tx, table })
    }

    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), StoreError> {
        let table = self.table;
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::database_operation(table, "commit", e))
    }

    pub async fn rollback(self) -> Result<(), StoreError> {
        let table = self.table;
        self.tx
            .rollback()
            .await
            .map_err(|e| StoreError::database_operation(table, "rollback", e))
    }

    /// Commit if `result` is Ok, otherwise roll back and return the original error
    pub async fn finish<T>(self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(error) => {
                let table = self.table;
                if let Err(rollback_error) = self.rollback().await {
                    tracing::warn!(table, error = %rollback_error, "rollback failed");
                }
                Err(error)
            }
        }
    }
}
