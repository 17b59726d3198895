//! Core FitHaus wiring
//!
//! Builds the connection pool from configuration, constructs the PostgreSQL
//! stores and the services on top of them, and owns the generation queue.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use store_object::{
    PgExerciseStore, PgUserStore, PgWorkoutExerciseStore, PgWorkoutStore, StoreContext,
    with_deadline,
};
use task_queue::{EventBus, JobQueue};

use crate::collaborators::{ObjectStorage, PasswordHasher, WorkoutGenerator};
use crate::errors::FitHausError;
use crate::generation::GenerationService;
use crate::services::{ExerciseService, UserService, WorkoutService};
use config::{AppConfig, DatabaseConfig};
use query_engine::FilterCompiler;

/// Main coordinator: pool, stores, services and the job queue
pub struct FitHaus {
    pool: PgPool,
    ctx: StoreContext,
    compiler: FilterCompiler,
    queue: Arc<JobQueue>,
    workouts: WorkoutService,
    exercises: ExerciseService,
}

impl FitHaus {
    /// Connect and build every store. Must be called within a tokio runtime.
    pub async fn new(config: &AppConfig) -> Result<Self, FitHausError> {
        let pool = connect(&config.database).await?;
        Ok(Self::from_pool(pool, config))
    }

    /// Build on an existing pool
    pub fn from_pool(pool: PgPool, config: &AppConfig) -> Self {
        let ctx = StoreContext::new(pool.clone(), &config.database, &config.query);
        let compiler = FilterCompiler::new(&config.query);

        let workout_store = Arc::new(PgWorkoutStore::new(ctx.clone()));
        let child_store = Arc::new(PgWorkoutExerciseStore::new(ctx.clone()));
        let exercise_store = Arc::new(PgExerciseStore::new(ctx.clone()));

        let workouts = WorkoutService::new(workout_store.clone(), child_store, compiler.clone());
        let exercises = ExerciseService::new(exercise_store, workout_store);
        let queue = Arc::new(JobQueue::start(&config.generation, Arc::new(EventBus::new())));

        Self {
            pool,
            ctx,
            compiler,
            queue,
            workouts,
            exercises,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn workouts(&self) -> &WorkoutService {
        &self.workouts
    }

    pub fn exercises(&self) -> &ExerciseService {
        &self.exercises
    }

    /// Job lifecycle events; register callbacks here to observe generation
    pub fn events(&self) -> &Arc<EventBus> {
        self.queue.events()
    }

    pub fn users(
        &self,
        hasher: Arc<dyn PasswordHasher>,
        storage: Arc<dyn ObjectStorage>,
    ) -> UserService {
        UserService::new(
            Arc::new(PgUserStore::new(self.ctx.clone())),
            hasher,
            storage,
            self.compiler.clone(),
        )
    }

    pub fn generation(&self, generator: Arc<dyn WorkoutGenerator>) -> GenerationService {
        GenerationService::new(self.queue.clone(), generator, self.workouts.clone())
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), FitHausError> {
        with_deadline(self.ctx.deadline(), "health_check", async {
            sqlx::query("SELECT 1")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| store_object::StoreError::database_operation("pool", "health_check", e))
        })
        .await?;
        Ok(())
    }

    /// Drain queued jobs, then close the pool
    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
        self.pool.close().await;
        tracing::info!("fithaus shut down");
    }
}

async fn connect(config: &DatabaseConfig) -> Result<PgPool, FitHausError> {
    let mut pool_options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

    // Set max lifetime if specified
    if config.max_lifetime_seconds > 0 {
        pool_options = pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
    }

    let pool = pool_options.connect(&config.connection_string()).await?;
    tracing::info!(
        host = %config.host,
        database = %config.database,
        max_connections = config.max_connections,
        "database pool ready"
    );
    Ok(pool)
}
