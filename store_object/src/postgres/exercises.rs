use super::StoreContext;
use crate::deadline::with_deadline;
use crate::errors::StoreError;
use crate::records::{ExerciseRecord, ExerciseWithWorkoutCheck};
use crate::tables::EXERCISES;
use crate::traits::ExerciseRepository;
use crate::transaction::StoreTransaction;
use async_trait::async_trait;
use sqlx::PgConnection;

#[derive(Debug, Clone)]
pub struct PgExerciseStore {
    ctx: StoreContext,
}

impl PgExerciseStore {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }
}

/// Id of the exercise called `name` that `user_id` may use: a shared one
/// first, then one of their own custom exercises. Creates a custom exercise
/// when neither exists.
pub(crate) async fn resolve_exercise(
    conn: &mut PgConnection,
    name: &str,
    user_id: i64,
) -> Result<i64, StoreError> {
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT e.id FROM exercises e \
         LEFT JOIN user_exercises ue ON ue.exercise_id = e.id \
         WHERE e.name = $1 AND (ue.user_id IS NULL OR ue.user_id = $2) \
         ORDER BY ue.user_id NULLS FIRST, e.id ASC LIMIT 1",
    )
    .bind(name)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| StoreError::database_operation(EXERCISES, "resolve", e))?;

    match existing {
        Some(id) => Ok(id),
        None => insert_custom_exercise(conn, name, user_id).await,
    }
}

pub(crate) async fn insert_custom_exercise(
    conn: &mut PgConnection,
    name: &str,
    user_id: i64,
) -> Result<i64, StoreError> {
    let exercise_id: i64 = sqlx::query_scalar("INSERT INTO exercises (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| StoreError::database_operation(EXERCISES, "create_custom", e))?;

    sqlx::query("INSERT INTO user_exercises (user_id, exercise_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(exercise_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::database_operation("user_exercises", "create_custom", e))?;

    tracing::debug!(exercise_id, user_id, "created custom exercise");
    Ok(exercise_id)
}

#[async_trait]
impl ExerciseRepository for PgExerciseStore {
    async fn find_by_name(&self, name: &str) -> Result<ExerciseRecord, StoreError> {
        with_deadline(self.ctx.deadline(), "exercises.find_by_name", async {
            sqlx::query_as::<_, ExerciseRecord>(
                "SELECT e.id, e.name, e.created_at FROM exercises e \
                 WHERE e.name = $1 \
                   AND NOT EXISTS (SELECT 1 FROM user_exercises ue WHERE ue.exercise_id = e.id) \
                 ORDER BY e.id ASC LIMIT 1",
            )
            .bind(name)
            .fetch_optional(self.ctx.pool())
            .await
            .map_err(|e| StoreError::database_operation(EXERCISES, "find_by_name", e))?
            .ok_or(StoreError::not_found("exercise"))
        })
        .await
    }

    async fn create_custom(&self, name: &str, user_id: i64) -> Result<i64, StoreError> {
        with_deadline(self.ctx.deadline(), "exercises.create_custom", async {
            let mut tx = StoreTransaction::begin(self.ctx.pool(), EXERCISES).await?;
            let result = async {
                let conn = tx.conn();
                let duplicate: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM exercises e \
                     JOIN user_exercises ue ON ue.exercise_id = e.id \
                     WHERE e.name = $1 AND ue.user_id = $2)",
                )
                .bind(name)
                .bind(user_id)
                .fetch_one(&mut *conn)
                .await
                .map_err(|e| StoreError::database_operation(EXERCISES, "create_custom", e))?;
                if duplicate {
                    return Err(StoreError::Conflict { table: EXERCISES });
                }
                insert_custom_exercise(conn, name, user_id).await
            }
            .await;
            tx.finish(result).await
        })
        .await
    }

    async fn list_with_workout_check(
        &self,
        workout_id: i64,
    ) -> Result<Vec<ExerciseWithWorkoutCheck>, StoreError> {
        with_deadline(self.ctx.deadline(), "exercises.list_with_workout_check", async {
            sqlx::query_as::<_, ExerciseWithWorkoutCheck>(
                "SELECT e.id, e.name, \
                 EXISTS (SELECT 1 FROM workout_exercises we \
                         WHERE we.exercise_id = e.id AND we.workout_id = $1) AS is_in_workout \
                 FROM exercises e \
                 WHERE NOT EXISTS (SELECT 1 FROM user_exercises ue WHERE ue.exercise_id = e.id) \
                    OR EXISTS (SELECT 1 FROM user_exercises ue \
                               JOIN workouts w ON w.owner_id = ue.user_id \
                               WHERE ue.exercise_id = e.id AND w.id = $1) \
                 ORDER BY e.id ASC",
            )
            .bind(workout_id)
            .fetch_all(self.ctx.pool())
            .await
            .map_err(|e| StoreError::database_operation(EXERCISES, "list_with_workout_check", e))
        })
        .await
    }
}
