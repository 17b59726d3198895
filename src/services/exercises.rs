use crate::errors::ServiceError;
use crate::identity::Requester;
use crate::responses::{ExerciseCheckResponse, ExerciseResponse};
use crate::services::required_text;
use crate::visibility::can_list;
use std::sync::Arc;
use store_object::{ExerciseRepository, WorkoutRepository};

/// The exercise catalogue: shared exercises plus per-user customs
#[derive(Clone)]
pub struct ExerciseService {
    exercises: Arc<dyn ExerciseRepository>,
    workouts: Arc<dyn WorkoutRepository>,
}

impl ExerciseService {
    pub fn new(exercises: Arc<dyn ExerciseRepository>, workouts: Arc<dyn WorkoutRepository>) -> Self {
        Self {
            exercises,
            workouts,
        }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<ExerciseResponse, ServiceError> {
        let name = required_text("name", name)?;
        Ok(self.exercises.find_by_name(&name).await?.into())
    }

    pub async fn create_custom(
        &self,
        requester: &Requester,
        name: &str,
    ) -> Result<ExerciseResponse, ServiceError> {
        let name = required_text("name", name)?;
        let id = self.exercises.create_custom(&name, requester.id).await?;
        crate::debug_log!(exercise_id = id, user_id = requester.id, "custom exercise created");
        Ok(ExerciseResponse { id, name })
    }

    /// Catalogue entries available to a workout's owner, flagged when the
    /// workout already contains them
    pub async fn list_with_workout_check(
        &self,
        requester: &Requester,
        workout_id: i64,
    ) -> Result<Vec<ExerciseCheckResponse>, ServiceError> {
        let workout = self.workouts.find_by_id(workout_id).await?;
        if !can_list(requester, &workout) {
            return Err(ServiceError::not_found("workout"));
        }

        let rows = self.exercises.list_with_workout_check(workout_id).await?;
        Ok(rows.into_iter().map(ExerciseCheckResponse::from).collect())
    }
}
