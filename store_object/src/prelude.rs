//! Convenience re-exports for common store-object usage

// Repository contracts
pub use crate::traits::{ExerciseRepository, UserRepository, WorkoutExerciseRepository, WorkoutRepository};

// PostgreSQL implementations
pub use crate::postgres::{
    PgExerciseStore, PgUserStore, PgWorkoutExerciseStore, PgWorkoutStore, StoreContext,
};

// Error types
pub use crate::errors::StoreError;

// Records and partial updates
pub use crate::patch::{Patch, UserPatch, WorkoutExercisePatch, WorkoutPatch};
pub use crate::records::*;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use sqlx::PgPool;
