//! Contracts for the external services FitHaus talks to.
//!
//! Authentication, password hashing, object storage and workout generation
//! live outside this crate; callers supply implementations.

use crate::identity::Requester;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("object storage failed: {0}")]
    Storage(String),

    #[error("workout generation failed: {0}")]
    Generation(String),
}

/// Resolves a bearer credential to the requester it belongs to
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credential: &str) -> Result<Requester, CollaboratorError>;
}

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key` and return the public URL
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<String, CollaboratorError>;
}

/// What a client asks the generator for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPreferences {
    pub goal: String,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default = "default_exercise_count")]
    pub exercise_count: u8,
}

fn default_exercise_count() -> u8 {
    6
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorkout {
    pub title: String,
    pub description: String,
    pub exercises: Vec<String>,
}

#[async_trait]
pub trait WorkoutGenerator: Send + Sync {
    async fn generate(
        &self,
        preferences: &GenerationPreferences,
    ) -> Result<GeneratedWorkout, CollaboratorError>;
}
