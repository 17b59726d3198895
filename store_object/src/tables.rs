//! Filterable tables and their column allow-lists

use query_engine::{ColumnSpec, ColumnType, TableSpec};

pub static WORKOUTS: TableSpec = TableSpec::new(
    "workouts",
    "id",
    &[
        ColumnSpec::new("id", ColumnType::BigInt),
        ColumnSpec::new("owner_id", ColumnType::BigInt),
        ColumnSpec::new("title", ColumnType::Text),
        ColumnSpec::new("description", ColumnType::Text),
        ColumnSpec::new("is_private", ColumnType::Boolean),
        ColumnSpec::new("price", ColumnType::Float),
        ColumnSpec::new("created_at", ColumnType::Timestamp),
        ColumnSpec::new("updated_at", ColumnType::Timestamp),
    ],
);

pub static USERS: TableSpec = TableSpec::new(
    "users",
    "id",
    &[
        ColumnSpec::new("id", ColumnType::BigInt),
        ColumnSpec::new("email", ColumnType::Text),
        ColumnSpec::new("username", ColumnType::Text),
        ColumnSpec::new("bio", ColumnType::Text),
        ColumnSpec::new("created_at", ColumnType::Timestamp),
    ],
)
.with_hidden(&["password_hash", "card_pan", "deleted_at"]);

pub const WORKOUT_EXERCISES: &str = "workout_exercises";
pub const EXERCISES: &str = "exercises";
pub const WORKOUT_LIKES: &str = "workout_likes";
