//! Shapes returned to and accepted from clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store_object::{
    ExerciseRecord, ExerciseWithWorkoutCheck, LikeState, Patch, UserRecord, WorkoutExercisePatch,
    WorkoutExerciseRecord, WorkoutPatch, WorkoutRecord,
};

/// One page of a listing with the total across all pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutExerciseResponse {
    pub id: i64,
    pub exercise_id: i64,
    pub name: String,
    pub main_note: String,
    pub secondary_note: String,
}

impl From<WorkoutExerciseRecord> for WorkoutExerciseResponse {
    fn from(record: WorkoutExerciseRecord) -> Self {
        Self {
            id: record.id,
            exercise_id: record.exercise_id,
            name: record.exercise_name,
            main_note: record.main_note,
            secondary_note: record.secondary_note,
        }
    }
}

/// A workout as the requester may see it.
///
/// `exercises` is absent, not empty, when the requester may not view the
/// workout's details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutResponse {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub is_private: bool,
    pub price: f64,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<WorkoutExerciseResponse>>,
}

impl WorkoutResponse {
    pub fn new(record: WorkoutRecord, exercises: Option<Vec<WorkoutExerciseResponse>>) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            description: record.description,
            is_private: record.is_private,
            price: record.price,
            likes_count: record.likes_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
            exercises,
        }
    }
}

/// Public view of a user. Credentials and card data never leave the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub bio: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            username: record.username,
            bio: record.bio,
            avatar: record.avatar,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseResponse {
    pub id: i64,
    pub name: String,
}

impl From<ExerciseRecord> for ExerciseResponse {
    fn from(record: ExerciseRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseCheckResponse {
    pub id: i64,
    pub name: String,
    pub is_in_workout: bool,
}

impl From<ExerciseWithWorkoutCheck> for ExerciseCheckResponse {
    fn from(record: ExerciseWithWorkoutCheck) -> Self {
        Self {
            id: record.id,
            name: record.name,
            is_in_workout: record.is_in_workout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LikeResponse {
    pub workout_id: i64,
    pub state: LikeState,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateWorkoutRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub exercises: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_private: Option<bool>,
    pub price: Option<f64>,
}

impl From<UpdateWorkoutRequest> for WorkoutPatch {
    fn from(request: UpdateWorkoutRequest) -> Self {
        Self {
            title: request.title.into(),
            description: request.description.into(),
            is_private: request.is_private.into(),
            price: request.price.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UpdateNotesRequest {
    pub main_note: Option<String>,
    pub secondary_note: Option<String>,
}

impl From<UpdateNotesRequest> for WorkoutExercisePatch {
    fn from(request: UpdateNotesRequest) -> Self {
        Self {
            main_note: request.main_note.into(),
            secondary_note: request.secondary_note.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// A user update. The plain password is hashed before it becomes part of a
/// [`store_object::UserPatch`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub(crate) fn into_patch(self, password_hash: Option<String>) -> store_object::UserPatch {
        store_object::UserPatch {
            email: self.email.into(),
            username: self.username.into(),
            bio: self.bio.into(),
            avatar: Patch::Unchanged,
            password_hash: password_hash.into(),
        }
    }
}
