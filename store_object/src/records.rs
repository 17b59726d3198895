//! Row types read from and written to the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A workout row with its like count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutRecord {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub is_private: bool,
    pub price: f64,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkoutRecord {
    pub fn is_free(&self) -> bool {
        self.price == 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub is_private: bool,
    pub price: f64,
}

/// A workout exercise joined with its exercise name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutExerciseRecord {
    pub id: i64,
    pub workout_id: i64,
    pub owner_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub main_note: String,
    pub secondary_note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseRecord {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// An exercise flagged with whether a given workout already contains it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseWithWorkoutCheck {
    pub id: i64,
    pub name: String,
    pub is_in_workout: bool,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub bio: String,
    pub avatar: String,
    pub card_pan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// State of a requester's like after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeState {
    Liked,
    Unliked,
}

/// One page of a filtered listing and the total matching rows
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub rows: Vec<T>,
    pub total: i64,
}

/// Which rows a listing may contain regardless of client filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Administrators see every row
    Everything,
    /// Public rows plus the requester's own
    VisibleTo(i64),
}
