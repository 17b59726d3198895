//! PostgreSQL implementations of the repository traits

mod exercises;
mod users;
mod workout_exercises;
mod workouts;

pub use exercises::PgExerciseStore;
pub use users::PgUserStore;
pub use workout_exercises::PgWorkoutExerciseStore;
pub use workouts::{workouts_query, PgWorkoutStore};

use crate::binding::{bind_values_as, bind_values_scalar};
use crate::errors::StoreError;
use crate::records::Listing;
use crate::transaction::StoreTransaction;
use config::{DatabaseConfig, QueryConfig, UnknownKeyPolicy};
use query_engine::QueryPair;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::time::Duration;

/// What every PostgreSQL store shares: the pool, the per-operation deadline
/// and the listing policy for unknown filter keys.
#[derive(Debug, Clone)]
pub struct StoreContext {
    pool: PgPool,
    deadline: Duration,
    unknown_keys: UnknownKeyPolicy,
}

impl StoreContext {
    pub fn new(pool: PgPool, database: &DatabaseConfig, query: &QueryConfig) -> Self {
        Self {
            pool,
            deadline: database.statement_timeout(),
            unknown_keys: query.unknown_keys,
        }
    }

    pub fn with_deadline(pool: PgPool, deadline: Duration) -> Self {
        Self {
            pool,
            deadline,
            unknown_keys: UnknownKeyPolicy::default(),
        }
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn unknown_keys(&self) -> UnknownKeyPolicy {
        self.unknown_keys
    }
}

/// Run a count/page pair inside one read-only snapshot so the total and the
/// rows describe the same state even under concurrent writes.
pub(crate) async fn fetch_listing<T>(
    pool: &PgPool,
    table: &'static str,
    pair: &QueryPair,
) -> Result<Listing<T>, StoreError>
where
    T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let mut tx = StoreTransaction::begin(pool, table).await?;

    let result: Result<Listing<T>, StoreError> = async {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(tx.conn())
            .await
            .map_err(|e| StoreError::database_operation(table, "list", e))?;

        let total: i64 = bind_values_scalar(sqlx::query_scalar(&pair.count.sql), &pair.count.values)
            .fetch_one(tx.conn())
            .await
            .map_err(|e| StoreError::database_operation(table, "count", e))?;

        let rows = bind_values_as(sqlx::query_as::<_, T>(&pair.page.sql), &pair.page.values)
            .fetch_all(tx.conn())
            .await
            .map_err(|e| StoreError::database_operation(table, "list", e))?;

        Ok(Listing { rows, total })
    }
    .await;

    tx.finish(result).await
}
