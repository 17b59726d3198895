use super::exercises::resolve_exercise;
use super::workout_exercises::insert_workout_exercise;
use super::{fetch_listing, StoreContext};
use crate::binding::{bind_values, bind_values_as};
use crate::deadline::with_deadline;
use crate::errors::StoreError;
use crate::patch::WorkoutPatch;
use crate::records::{LikeState, ListScope, Listing, NewWorkout, WorkoutRecord};
use crate::tables::{WORKOUTS, WORKOUT_LIKES};
use crate::traits::WorkoutRepository;
use crate::transaction::StoreTransaction;
use async_trait::async_trait;
use config::UnknownKeyPolicy;
use query_engine::{JoinClause, ListOrder, ListQuery, QueryFilter, QueryParams, SelectField};
use sqlx::PgConnection;

const WORKOUT_COLUMNS: [&str; 8] = [
    "workouts.id",
    "workouts.owner_id",
    "workouts.title",
    "workouts.description",
    "workouts.is_private",
    "workouts.price",
    "workouts.created_at",
    "workouts.updated_at",
];

/// The workouts listing shape: active likes counted per workout, restricted
/// to what `scope` may see.
pub fn workouts_query(scope: ListScope, unknown_keys: UnknownKeyPolicy) -> ListQuery<'static> {
    let mut select: Vec<SelectField> = WORKOUT_COLUMNS.iter().map(|c| SelectField::field(*c)).collect();
    select.push(SelectField::count_as("workout_likes.id", ListOrder::LIKES_ALIAS));

    let query = ListQuery::new(&WORKOUTS)
        .select(select)
        .join(
            JoinClause::left(WORKOUT_LIKES, "workouts.id", "workout_likes.workout_id")
                .and_is_null("workout_likes.deleted_at"),
        )
        .group_by("workouts.id")
        .unknown_keys(unknown_keys);

    match scope {
        ListScope::Everything => query,
        ListScope::VisibleTo(requester) => query.require(QueryFilter::or(vec![
            QueryFilter::eq("workouts.is_private", false),
            QueryFilter::eq("workouts.owner_id", requester),
        ])),
    }
}

#[derive(Debug, Clone)]
pub struct PgWorkoutStore {
    ctx: StoreContext,
}

impl PgWorkoutStore {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    async fn fetch(&self, query: ListQuery<'_>, operation: &'static str) -> Result<Vec<WorkoutRecord>, StoreError> {
        let statement = query.build(&QueryParams::unpaginated())?.page;
        bind_values_as(sqlx::query_as::<_, WorkoutRecord>(&statement.sql), &statement.values)
            .fetch_all(self.ctx.pool())
            .await
            .map_err(|e| StoreError::database_operation(WORKOUTS.name, operation, e))
    }
}

async fn copy_in_tx(conn: &mut PgConnection, id: i64, new_owner: i64) -> Result<i64, StoreError> {
    let (title, description): (String, String) =
        sqlx::query_as("SELECT title, description FROM workouts WHERE id = $1 FOR SHARE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| StoreError::database_operation(WORKOUTS.name, "copy", e))?
            .ok_or(StoreError::not_found("workout"))?;

    let new_id: i64 = sqlx::query_scalar(
        "INSERT INTO workouts (owner_id, title, description, is_private, price) \
         VALUES ($1, $2, $3, TRUE, 0) RETURNING id",
    )
    .bind(new_owner)
    .bind(&title)
    .bind(&description)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| StoreError::database_operation(WORKOUTS.name, "copy", e))?;

    let children: Vec<(i64, String, String)> = sqlx::query_as(
        "SELECT exercise_id, main_note, secondary_note FROM workout_exercises \
         WHERE workout_id = $1 ORDER BY id ASC",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| StoreError::database_operation(WORKOUTS.name, "copy", e))?;

    for (exercise_id, main_note, secondary_note) in &children {
        insert_workout_exercise(conn, new_id, new_owner, *exercise_id, main_note, secondary_note).await?;
    }

    tracing::debug!(source_id = id, new_id, children = children.len(), "copied workout rows");
    Ok(new_id)
}

#[async_trait]
impl WorkoutRepository for PgWorkoutStore {
    async fn list_filtered(
        &self,
        params: &QueryParams,
        scope: ListScope,
    ) -> Result<Listing<WorkoutRecord>, StoreError> {
        let pair = workouts_query(scope, self.ctx.unknown_keys())
            .order(ListOrder::MostLiked)
            .build(params)?;

        with_deadline(
            self.ctx.deadline(),
            "workouts.list",
            fetch_listing(self.ctx.pool(), WORKOUTS.name, &pair),
        )
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<WorkoutRecord, StoreError> {
        let query = workouts_query(ListScope::Everything, UnknownKeyPolicy::Reject)
            .require(QueryFilter::eq("workouts.id", id));

        with_deadline(self.ctx.deadline(), "workouts.find_by_id", async {
            self.fetch(query, "find_by_id")
                .await?
                .into_iter()
                .next()
                .ok_or(StoreError::not_found("workout"))
        })
        .await
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        include_private: bool,
    ) -> Result<Vec<WorkoutRecord>, StoreError> {
        let mut query = workouts_query(ListScope::Everything, UnknownKeyPolicy::Reject)
            .require(QueryFilter::eq("workouts.owner_id", owner_id))
            .order(ListOrder::Identity);
        if !include_private {
            query = query.require(QueryFilter::eq("workouts.is_private", false));
        }

        with_deadline(self.ctx.deadline(), "workouts.list_by_owner", self.fetch(query, "list_by_owner")).await
    }

    async fn create(&self, workout: &NewWorkout, exercise_names: &[String]) -> Result<i64, StoreError> {
        with_deadline(self.ctx.deadline(), "workouts.create", async {
            let mut tx = StoreTransaction::begin(self.ctx.pool(), WORKOUTS.name).await?;

            let result: Result<i64, StoreError> = async {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO workouts (owner_id, title, description, is_private, price) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING id",
                )
                .bind(workout.owner_id)
                .bind(&workout.title)
                .bind(&workout.description)
                .bind(workout.is_private)
                .bind(workout.price)
                .fetch_one(tx.conn())
                .await
                .map_err(|e| StoreError::database_operation(WORKOUTS.name, "create", e))?;

                for name in exercise_names {
                    let exercise_id = resolve_exercise(tx.conn(), name, workout.owner_id).await?;
                    insert_workout_exercise(tx.conn(), id, workout.owner_id, exercise_id, "", "").await?;
                }
                Ok(id)
            }
            .await;

            let id = tx.finish(result).await?;
            tracing::info!(workout_id = id, owner_id = workout.owner_id, "created workout");
            Ok(id)
        })
        .await
    }

    async fn update(&self, id: i64, patch: &WorkoutPatch) -> Result<(), StoreError> {
        let (sql, values) = patch.update_set().to_sql(WORKOUTS.name, "id");
        with_deadline(self.ctx.deadline(), "workouts.update", async {
            let updated = bind_values(sqlx::query(&sql), &values)
                .bind(id)
                .execute(self.ctx.pool())
                .await
                .map_err(|e| StoreError::database_operation(WORKOUTS.name, "update", e))?
                .rows_affected();

            if updated == 0 {
                return Err(StoreError::not_found("workout"));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        with_deadline(self.ctx.deadline(), "workouts.delete", async {
            let deleted = sqlx::query("DELETE FROM workouts WHERE id = $1")
                .bind(id)
                .execute(self.ctx.pool())
                .await
                .map_err(|e| StoreError::database_operation(WORKOUTS.name, "delete", e))?
                .rows_affected();

            if deleted == 0 {
                return Err(StoreError::not_found("workout"));
            }
            tracing::info!(workout_id = id, "deleted workout");
            Ok(())
        })
        .await
    }

    async fn copy(&self, id: i64, new_owner: i64) -> Result<i64, StoreError> {
        with_deadline(self.ctx.deadline(), "workouts.copy", async {
            let mut tx = StoreTransaction::begin(self.ctx.pool(), WORKOUTS.name).await?;
            let result = copy_in_tx(tx.conn(), id, new_owner).await;
            let new_id = tx.finish(result).await?;

            tracing::info!(source_id = id, new_id, new_owner, "copied workout");
            Ok(new_id)
        })
        .await
    }

    async fn toggle_like(&self, id: i64, user_id: i64) -> Result<LikeState, StoreError> {
        with_deadline(self.ctx.deadline(), "workouts.toggle_like", async {
            let unliked = sqlx::query(
                "UPDATE workout_likes SET deleted_at = NOW() \
                 WHERE workout_id = $1 AND user_id = $2 AND deleted_at IS NULL",
            )
            .bind(id)
            .bind(user_id)
            .execute(self.ctx.pool())
            .await
            .map_err(|e| StoreError::database_operation(WORKOUT_LIKES, "toggle_like", e))?
            .rows_affected();

            if unliked > 0 {
                return Ok(LikeState::Unliked);
            }

            let inserted = sqlx::query("INSERT INTO workout_likes (workout_id, user_id) VALUES ($1, $2)")
                .bind(id)
                .bind(user_id)
                .execute(self.ctx.pool())
                .await
                .map_err(|e| StoreError::database_operation(WORKOUT_LIKES, "toggle_like", e));

            match inserted {
                Ok(_) => Ok(LikeState::Liked),
                // A concurrent toggle from the same user won the insert
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(workout_id = id, user_id, "like already inserted concurrently");
                    Ok(LikeState::Liked)
                }
                Err(StoreError::ForeignKeyViolation { .. }) => Err(StoreError::not_found("workout")),
                Err(e) => Err(e),
            }
        })
        .await
    }
}
