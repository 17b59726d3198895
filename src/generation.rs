//! Background workout generation
//!
//! A request is validated and queued, and the caller gets a job id at once.
//! A worker later asks the [`WorkoutGenerator`] for a plan and stores it as a
//! private workout of the requester. Progress is published on the queue's
//! event bus.

use crate::collaborators::{GenerationPreferences, WorkoutGenerator};
use crate::errors::ServiceError;
use crate::identity::Requester;
use crate::responses::CreateWorkoutRequest;
use crate::services::WorkoutService;
use async_trait::async_trait;
use std::sync::Arc;
use task_queue::{Job, JobQueue};
use uuid::Uuid;

const MAX_EXERCISES: u8 = 20;

/// One queued generation request. Owns everything it needs.
pub struct GenerationJob {
    requester: Requester,
    preferences: GenerationPreferences,
    generator: Arc<dyn WorkoutGenerator>,
    workouts: WorkoutService,
}

#[async_trait]
impl Job for GenerationJob {
    fn name(&self) -> &str {
        "generate_workout"
    }

    async fn run(self: Box<Self>) -> anyhow::Result<()> {
        let generated = self.generator.generate(&self.preferences).await?;
        let request = CreateWorkoutRequest {
            title: generated.title,
            description: generated.description,
            is_private: true,
            price: 0.0,
            exercises: generated.exercises,
        };

        let created = self.workouts.create(&self.requester, request).await?;
        tracing::info!(
            workout_id = created.id,
            owner_id = self.requester.id,
            "generated workout stored"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct GenerationService {
    queue: Arc<JobQueue>,
    generator: Arc<dyn WorkoutGenerator>,
    workouts: WorkoutService,
}

impl GenerationService {
    pub fn new(
        queue: Arc<JobQueue>,
        generator: Arc<dyn WorkoutGenerator>,
        workouts: WorkoutService,
    ) -> Self {
        Self {
            queue,
            generator,
            workouts,
        }
    }

    /// Queue a generation request. Fails with `Unavailable` when the queue
    /// is full or shut down.
    pub fn request(
        &self,
        requester: &Requester,
        preferences: GenerationPreferences,
    ) -> Result<Uuid, ServiceError> {
        if preferences.goal.trim().is_empty() {
            return Err(ServiceError::bad_request("goal must not be empty"));
        }
        if preferences.exercise_count == 0 || preferences.exercise_count > MAX_EXERCISES {
            return Err(ServiceError::bad_request(format!(
                "exercise_count must be between 1 and {}",
                MAX_EXERCISES
            )));
        }

        let job_id = self.queue.submit(GenerationJob {
            requester: *requester,
            preferences,
            generator: self.generator.clone(),
            workouts: self.workouts.clone(),
        })?;
        tracing::info!(%job_id, requester = requester.id, "workout generation queued");
        Ok(job_id)
    }
}
