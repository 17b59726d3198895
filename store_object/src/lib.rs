//! Store Object - PostgreSQL persistence for FitHaus
//!
//! Records, repository traits and their sqlx implementations. Every driver
//! error is translated into [`StoreError`] here, every operation runs under
//! the configured deadline, and multi-statement operations (create with
//! children, copy, bulk add/remove) run in a single transaction.

pub mod binding;
pub mod deadline;
pub mod errors;
pub mod patch;
pub mod postgres;
pub mod prelude;
pub mod records;
pub mod tables;
pub mod traits;
pub mod transaction;

pub use deadline::with_deadline;
pub use errors::StoreError;
pub use patch::{Patch, UpdateSet, UserPatch, WorkoutExercisePatch, WorkoutPatch};
pub use postgres::{
    PgExerciseStore, PgUserStore, PgWorkoutExerciseStore, PgWorkoutStore, StoreContext,
};
pub use records::*;
pub use traits::{ExerciseRepository, UserRepository, WorkoutExerciseRepository, WorkoutRepository};
pub use transaction::StoreTransaction;

use sqlx::PgPool;

pub type DbPool = PgPool;
