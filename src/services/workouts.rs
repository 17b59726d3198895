use crate::assembler::WorkoutAssembler;
use crate::errors::ServiceError;
use crate::identity::Requester;
use crate::responses::{
    CreateWorkoutRequest, LikeResponse, Page, UpdateNotesRequest, UpdateWorkoutRequest,
    WorkoutResponse,
};
use crate::services::{exercise_names, required_text, validate_price};
use crate::visibility::{can_copy, can_list, list_scope};
use query_engine::FilterCompiler;
use std::sync::Arc;
use store_object::{
    NewWorkout, Patch, WorkoutExercisePatch, WorkoutExerciseRepository, WorkoutPatch, WorkoutRecord,
    WorkoutRepository,
};

/// Workouts, their likes and their exercise lists
#[derive(Clone)]
pub struct WorkoutService {
    workouts: Arc<dyn WorkoutRepository>,
    children: Arc<dyn WorkoutExerciseRepository>,
    assembler: WorkoutAssembler,
    compiler: FilterCompiler,
}

impl WorkoutService {
    pub fn new(
        workouts: Arc<dyn WorkoutRepository>,
        children: Arc<dyn WorkoutExerciseRepository>,
        compiler: FilterCompiler,
    ) -> Self {
        Self {
            workouts,
            assembler: WorkoutAssembler::new(children.clone()),
            children,
            compiler,
        }
    }

    /// Filtered listing ordered by most liked
    pub async fn list<K, V>(
        &self,
        requester: &Requester,
        query: &[(K, V)],
    ) -> Result<Page<WorkoutResponse>, ServiceError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = self
            .compiler
            .compile(query.iter().map(|(k, v)| (k, v)))?;
        let listing = self
            .workouts
            .list_filtered(&params, list_scope(requester))
            .await?;
        let items = self.assembler.assemble(requester, listing.rows).await?;

        Ok(Page {
            items,
            total: listing.total,
            page: params.pagination.page,
            limit: params.pagination.limit,
        })
    }

    pub async fn get(&self, requester: &Requester, id: i64) -> Result<WorkoutResponse, ServiceError> {
        let workout = self.visible_workout(requester, id).await?;
        self.assembler.assemble_one(requester, workout).await
    }

    pub async fn list_by_owner(
        &self,
        requester: &Requester,
        owner_id: i64,
    ) -> Result<Vec<WorkoutResponse>, ServiceError> {
        let rows = self
            .workouts
            .list_by_owner(owner_id, requester.may_manage(owner_id))
            .await?;
        self.assembler.assemble(requester, rows).await
    }

    pub async fn create(
        &self,
        requester: &Requester,
        request: CreateWorkoutRequest,
    ) -> Result<WorkoutResponse, ServiceError> {
        validate_price(request.price)?;
        let names = if request.exercises.is_empty() {
            Vec::new()
        } else {
            exercise_names(&request.exercises)?
        };
        let workout = NewWorkout {
            owner_id: requester.id,
            title: required_text("title", &request.title)?,
            description: request.description,
            is_private: request.is_private,
            price: request.price,
        };

        let id = self.workouts.create(&workout, &names).await?;
        tracing::info!(workout_id = id, owner_id = requester.id, "workout created");
        self.get(requester, id).await
    }

    pub async fn update(
        &self,
        requester: &Requester,
        id: i64,
        request: UpdateWorkoutRequest,
    ) -> Result<WorkoutResponse, ServiceError> {
        self.managed_workout(requester, id).await?;
        if let Some(price) = request.price {
            validate_price(price)?;
        }
        let mut patch = WorkoutPatch::from(request);
        if let Patch::Set(title) = &mut patch.title {
            *title = required_text("title", title)?;
        }

        self.workouts.update(id, &patch).await?;
        self.get(requester, id).await
    }

    pub async fn delete(&self, requester: &Requester, id: i64) -> Result<(), ServiceError> {
        self.managed_workout(requester, id).await?;
        self.workouts.delete(id).await?;
        tracing::info!(workout_id = id, requester = requester.id, "workout deleted");
        Ok(())
    }

    /// Copy a public free workout, or one of the requester's own, into a new
    /// private free workout owned by the requester.
    pub async fn copy(&self, requester: &Requester, id: i64) -> Result<WorkoutResponse, ServiceError> {
        let source = self.visible_workout(requester, id).await?;
        if !can_copy(requester, &source) {
            return Err(ServiceError::forbidden(
                "only public free workouts or your own can be copied",
            ));
        }

        let new_id = self.workouts.copy(id, requester.id).await?;
        tracing::info!(source_id = id, workout_id = new_id, owner_id = requester.id, "workout copied");
        self.get(requester, new_id).await
    }

    /// Obtain a paid workout. The requester receives a private copy.
    pub async fn purchase(&self, requester: &Requester, id: i64) -> Result<WorkoutResponse, ServiceError> {
        let source = self.visible_workout(requester, id).await?;
        if source.is_free() {
            return Err(ServiceError::bad_request("workout is free, copy it instead"));
        }
        if requester.owns(source.owner_id) {
            return Err(ServiceError::bad_request("workout already belongs to you"));
        }

        let new_id = self.workouts.copy(id, requester.id).await?;
        tracing::info!(source_id = id, workout_id = new_id, buyer = requester.id, "workout purchased");
        self.get(requester, new_id).await
    }

    pub async fn toggle_like(&self, requester: &Requester, id: i64) -> Result<LikeResponse, ServiceError> {
        self.visible_workout(requester, id).await?;
        let state = self.workouts.toggle_like(id, requester.id).await?;
        crate::debug_log!(workout_id = id, user_id = requester.id, ?state, "like toggled");
        Ok(LikeResponse {
            workout_id: id,
            state,
        })
    }

    /// Append exercises by name. Names the owner has never used become
    /// custom exercises.
    pub async fn add_exercises(
        &self,
        requester: &Requester,
        workout_id: i64,
        names: &[String],
    ) -> Result<WorkoutResponse, ServiceError> {
        let workout = self.managed_workout(requester, workout_id).await?;
        let names = exercise_names(names)?;

        let ids = self
            .children
            .add_by_names(workout_id, workout.owner_id, &names)
            .await?;
        tracing::info!(workout_id, added = ids.len(), "exercises added");
        self.get(requester, workout_id).await
    }

    /// Remove exercises from a workout. Nothing is removed unless every id
    /// belongs to it.
    pub async fn remove_exercises(
        &self,
        requester: &Requester,
        workout_id: i64,
        ids: &[i64],
    ) -> Result<WorkoutResponse, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::bad_request("at least one exercise id is required"));
        }
        self.managed_workout(requester, workout_id).await?;

        let removed = self.children.remove(workout_id, ids).await?;
        tracing::info!(workout_id, removed, "exercises removed");
        self.get(requester, workout_id).await
    }

    pub async fn update_notes(
        &self,
        requester: &Requester,
        workout_exercise_id: i64,
        request: UpdateNotesRequest,
    ) -> Result<WorkoutResponse, ServiceError> {
        let child = self.children.find_by_id(workout_exercise_id).await?;
        self.managed_workout(requester, child.workout_id).await?;

        self.children
            .update(workout_exercise_id, &WorkoutExercisePatch::from(request))
            .await?;
        self.get(requester, child.workout_id).await
    }

    /// A workout the requester may list. Hidden ones are reported as missing.
    async fn visible_workout(&self, requester: &Requester, id: i64) -> Result<WorkoutRecord, ServiceError> {
        let workout = self.workouts.find_by_id(id).await?;
        if !can_list(requester, &workout) {
            return Err(ServiceError::not_found("workout"));
        }
        Ok(workout)
    }

    async fn managed_workout(&self, requester: &Requester, id: i64) -> Result<WorkoutRecord, ServiceError> {
        let workout = self.visible_workout(requester, id).await?;
        if !requester.may_manage(workout.owner_id) {
            return Err(ServiceError::forbidden("only the owner may change this workout"));
        }
        Ok(workout)
    }
}
