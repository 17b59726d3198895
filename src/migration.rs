//! Database schema
//!
//! Idempotent DDL for every table the stores use. `recreate` drops the
//! tables first and is meant for test databases.

use crate::core::FitHaus;
use crate::errors::FitHausError;
use sqlx::PgPool;

const DROP_TABLES: &str = "DROP TABLE IF EXISTS workout_likes, workout_exercises, workouts, \
                           user_exercises, exercises, users CASCADE";

const CREATE_TABLES: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        bio TEXT NOT NULL DEFAULT '',
        avatar TEXT NOT NULL DEFAULT '',
        card_pan TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ,
        deleted_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS exercises (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS user_exercises (
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        exercise_id BIGINT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, exercise_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS workouts (
        id BIGSERIAL PRIMARY KEY,
        owner_id BIGINT NOT NULL REFERENCES users(id),
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        is_private BOOLEAN NOT NULL DEFAULT FALSE,
        price DOUBLE PRECISION NOT NULL DEFAULT 0 CHECK (price >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS workout_exercises (
        id BIGSERIAL PRIMARY KEY,
        workout_id BIGINT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
        owner_id BIGINT NOT NULL REFERENCES users(id),
        exercise_id BIGINT NOT NULL REFERENCES exercises(id),
        main_note TEXT NOT NULL DEFAULT '',
        secondary_note TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS workout_likes (
        id BIGSERIAL PRIMARY KEY,
        workout_id BIGINT NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deleted_at TIMESTAMPTZ
    )"#,
];

const CREATE_INDEXES: &[&str] = &[
    // At most one live like per user and workout
    "CREATE UNIQUE INDEX IF NOT EXISTS workout_likes_live_idx \
     ON workout_likes (workout_id, user_id) WHERE deleted_at IS NULL",
    "CREATE INDEX IF NOT EXISTS workouts_owner_idx ON workouts (owner_id)",
    "CREATE INDEX IF NOT EXISTS workout_exercises_workout_idx ON workout_exercises (workout_id)",
    "CREATE INDEX IF NOT EXISTS exercises_name_idx ON exercises (name)",
];

/// Create every table and index that does not exist yet
pub async fn apply_schema(pool: &PgPool, recreate: bool) -> Result<(), FitHausError> {
    if recreate {
        tracing::warn!("dropping all fithaus tables");
        sqlx::query(DROP_TABLES)
            .execute(pool)
            .await
            .map_err(|e| FitHausError::Migration(e.to_string()))?;
    }

    for statement in CREATE_TABLES.iter().chain(CREATE_INDEXES) {
        crate::trace_log!(sql = %statement, "applying schema statement");
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| FitHausError::Migration(e.to_string()))?;
    }

    tracing::info!(
        tables = CREATE_TABLES.len(),
        indexes = CREATE_INDEXES.len(),
        "schema up to date"
    );
    Ok(())
}

impl FitHaus {
    pub async fn migrate(&self, recreate: bool) -> Result<(), FitHausError> {
        apply_schema(self.pool(), recreate).await
    }
}
