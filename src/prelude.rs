//! Convenience re-exports for common FitHaus usage
//!
//! ```rust
//! use fithaus::prelude::*;
//! ```

// Core FitHaus components
pub use crate::core::FitHaus;
pub use crate::errors::{FitHausError, ServiceError, StatusClass};
pub use crate::identity::{authenticate, Requester};
pub use crate::migration::apply_schema;

// Services and what they exchange with callers
pub use crate::collaborators::{
    Authenticator, CollaboratorError, GeneratedWorkout, GenerationPreferences, ObjectStorage,
    PasswordHasher, WorkoutGenerator,
};
pub use crate::generation::GenerationService;
pub use crate::responses::*;
pub use crate::services::{ExerciseService, UserService, WorkoutService};

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, GenerationConfig, QueryConfig, UnknownKeyPolicy};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Job lifecycle events
pub use task_queue::{EventBus, JobEvent, JobEventKind};

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;

// Commonly used sqlx types
pub use sqlx::PgPool;
