//! Repository contracts
//!
//! Services depend on these traits rather than on the PostgreSQL
//! implementations, so they can be exercised against in-memory doubles.

use crate::errors::StoreError;
use crate::patch::{UserPatch, WorkoutExercisePatch, WorkoutPatch};
use crate::records::{
    ExerciseRecord, ExerciseWithWorkoutCheck, LikeState, ListScope, Listing, NewUser, NewWorkout,
    UserRecord, WorkoutExerciseRecord, WorkoutRecord,
};
use async_trait::async_trait;
use query_engine::QueryParams;

#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    /// Filtered, paginated listing ordered by most liked. Count and page agree.
    async fn list_filtered(
        &self,
        params: &QueryParams,
        scope: ListScope,
    ) -> Result<Listing<WorkoutRecord>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<WorkoutRecord, StoreError>;

    /// Workouts of one owner in identity order
    async fn list_by_owner(
        &self,
        owner_id: i64,
        include_private: bool,
    ) -> Result<Vec<WorkoutRecord>, StoreError>;

    /// Insert a workout and one child row per exercise name, atomically.
    /// Names unknown to the owner become custom exercises.
    async fn create(&self, workout: &NewWorkout, exercise_names: &[String]) -> Result<i64, StoreError>;

    async fn update(&self, id: i64, patch: &WorkoutPatch) -> Result<(), StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Clone a workout and its children for `new_owner`. All or nothing.
    async fn copy(&self, id: i64, new_owner: i64) -> Result<i64, StoreError>;

    async fn toggle_like(&self, id: i64, user_id: i64) -> Result<LikeState, StoreError>;
}

#[async_trait]
pub trait WorkoutExerciseRepository: Send + Sync {
    /// Children of many workouts in one round trip, ordered by id
    async fn list_by_workouts(&self, workout_ids: &[i64]) -> Result<Vec<WorkoutExerciseRecord>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<WorkoutExerciseRecord, StoreError>;

    /// Append exercises by name in one transaction; returns the new row ids
    async fn add_by_names(
        &self,
        workout_id: i64,
        owner_id: i64,
        names: &[String],
    ) -> Result<Vec<i64>, StoreError>;

    /// Remove rows of one workout in one transaction. Fails with `NotFound`
    /// and removes nothing unless every id belongs to the workout.
    async fn remove(&self, workout_id: i64, ids: &[i64]) -> Result<u64, StoreError>;

    async fn update(&self, id: i64, patch: &WorkoutExercisePatch) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Filtered listing over users that are not soft-deleted
    async fn list_filtered(&self, params: &QueryParams) -> Result<Listing<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<UserRecord, StoreError>;

    async fn create(&self, user: &NewUser) -> Result<i64, StoreError>;

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<(), StoreError>;

    async fn soft_delete(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<ExerciseRecord, StoreError>;

    /// Create an exercise visible only to `user_id`
    async fn create_custom(&self, name: &str, user_id: i64) -> Result<i64, StoreError>;

    /// Every exercise, flagged when `workout_id` already contains it
    async fn list_with_workout_check(&self, workout_id: i64) -> Result<Vec<ExerciseWithWorkoutCheck>, StoreError>;
}
