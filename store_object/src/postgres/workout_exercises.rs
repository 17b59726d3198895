use super::exercises::resolve_exercise;
use super::StoreContext;
use crate::binding::bind_values;
use crate::deadline::with_deadline;
use crate::errors::StoreError;
use crate::patch::WorkoutExercisePatch;
use crate::records::WorkoutExerciseRecord;
use crate::tables::WORKOUT_EXERCISES;
use crate::traits::WorkoutExerciseRepository;
use crate::transaction::StoreTransaction;
use async_trait::async_trait;
use sqlx::PgConnection;

const SELECT_WITH_NAME: &str = "SELECT we.id, we.workout_id, we.owner_id, we.exercise_id, \
     e.name AS exercise_name, we.main_note, we.secondary_note, we.created_at \
     FROM workout_exercises we JOIN exercises e ON we.exercise_id = e.id";

#[derive(Debug, Clone)]
pub struct PgWorkoutExerciseStore {
    ctx: StoreContext,
}

impl PgWorkoutExerciseStore {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }
}

pub(crate) async fn insert_workout_exercise(
    conn: &mut PgConnection,
    workout_id: i64,
    owner_id: i64,
    exercise_id: i64,
    main_note: &str,
    secondary_note: &str,
) -> Result<i64, StoreError> {
    sqlx::query_scalar(
        "INSERT INTO workout_exercises (workout_id, owner_id, exercise_id, main_note, secondary_note) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(workout_id)
    .bind(owner_id)
    .bind(exercise_id)
    .bind(main_note)
    .bind(secondary_note)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| StoreError::database_operation(WORKOUT_EXERCISES, "insert", e))
}

#[async_trait]
impl WorkoutExerciseRepository for PgWorkoutExerciseStore {
    async fn list_by_workouts(
        &self,
        workout_ids: &[i64],
    ) -> Result<Vec<WorkoutExerciseRecord>, StoreError> {
        if workout_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{} WHERE we.workout_id = ANY($1) ORDER BY we.id ASC", SELECT_WITH_NAME);
        with_deadline(self.ctx.deadline(), "workout_exercises.list_by_workouts", async {
            sqlx::query_as::<_, WorkoutExerciseRecord>(&sql)
                .bind(workout_ids.to_vec())
                .fetch_all(self.ctx.pool())
                .await
                .map_err(|e| StoreError::database_operation(WORKOUT_EXERCISES, "list_by_workouts", e))
        })
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<WorkoutExerciseRecord, StoreError> {
        let sql = format!("{} WHERE we.id = $1", SELECT_WITH_NAME);
        with_deadline(self.ctx.deadline(), "workout_exercises.find_by_id", async {
            sqlx::query_as::<_, WorkoutExerciseRecord>(&sql)
                .bind(id)
                .fetch_optional(self.ctx.pool())
                .await
                .map_err(|e| StoreError::database_operation(WORKOUT_EXERCISES, "find_by_id", e))?
                .ok_or(StoreError::not_found("workout exercise"))
        })
        .await
    }

    async fn add_by_names(
        &self,
        workout_id: i64,
        owner_id: i64,
        names: &[String],
    ) -> Result<Vec<i64>, StoreError> {
        with_deadline(self.ctx.deadline(), "workout_exercises.add", async {
            let mut tx = StoreTransaction::begin(self.ctx.pool(), WORKOUT_EXERCISES).await?;

            let result: Result<Vec<i64>, StoreError> = async {
                let mut ids = Vec::with_capacity(names.len());
                for name in names {
                    let exercise_id = resolve_exercise(tx.conn(), name, owner_id).await?;
                    ids.push(
                        insert_workout_exercise(tx.conn(), workout_id, owner_id, exercise_id, "", "")
                            .await?,
                    );
                }
                Ok(ids)
            }
            .await;

            let ids = tx.finish(result).await?;
            tracing::info!(workout_id, added = ids.len(), "added workout exercises");
            Ok(ids)
        })
        .await
    }

    async fn remove(&self, workout_id: i64, ids: &[i64]) -> Result<u64, StoreError> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(0);
        }

        with_deadline(self.ctx.deadline(), "workout_exercises.remove", async {
            let mut tx = StoreTransaction::begin(self.ctx.pool(), WORKOUT_EXERCISES).await?;

            let result: Result<u64, StoreError> = async {
                let removed = sqlx::query(
                    "DELETE FROM workout_exercises WHERE workout_id = $1 AND id = ANY($2)",
                )
                .bind(workout_id)
                .bind(ids.as_slice())
                .execute(tx.conn())
                .await
                .map_err(|e| StoreError::database_operation(WORKOUT_EXERCISES, "remove", e))?
                .rows_affected();

                // Any id outside this workout voids the whole batch
                if removed != ids.len() as u64 {
                    return Err(StoreError::not_found("workout exercise"));
                }
                Ok(removed)
            }
            .await;

            let removed = tx.finish(result).await?;
            tracing::info!(workout_id, removed, "removed workout exercises");
            Ok(removed)
        })
        .await
    }

    async fn update(&self, id: i64, patch: &WorkoutExercisePatch) -> Result<(), StoreError> {
        let (sql, values) = patch.update_set().to_sql(WORKOUT_EXERCISES, "id");
        with_deadline(self.ctx.deadline(), "workout_exercises.update", async {
            let updated = bind_values(sqlx::query(&sql), &values)
                .bind(id)
                .execute(self.ctx.pool())
                .await
                .map_err(|e| StoreError::database_operation(WORKOUT_EXERCISES, "update", e))?
                .rows_affected();

            if updated == 0 {
                return Err(StoreError::not_found("workout exercise"));
            }
            Ok(())
        })
        .await
    }
}
