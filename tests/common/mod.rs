//! Shared setup for the PostgreSQL integration tests.
//!
//! Tests return early when `DATABASE_URL` is not set.

#![allow(dead_code)]

use fithaus::prelude::*;
use tokio::sync::OnceCell;
use uuid::Uuid;

static SCHEMA: OnceCell<()> = OnceCell::const_new();

const TEST_CONFIG: &str = r#"
    [database]
    host = "localhost"
    port = 5432
    database = "fithaus_test"
    username = "postgres"
    password = "postgres"
    min_connections = 1
    max_connections = 5
    connection_timeout_seconds = 5
    idle_timeout_seconds = 60
    max_lifetime_seconds = 600
    statement_timeout_ms = 10000
"#;

pub fn test_config() -> AppConfig {
    AppConfig::from_toml_str(TEST_CONFIG).expect("test config parses")
}

/// A FitHaus on the test database, or `None` when no database is configured
pub async fn setup() -> Option<FitHaus> {
    setup_with(test_config()).await
}

pub async fn setup_with(config: AppConfig) -> Option<FitHaus> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        }
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    SCHEMA
        .get_or_init(|| async {
            apply_schema(&pool, false).await.expect("schema applies");
        })
        .await;

    Some(FitHaus::from_pool(pool, &config))
}

/// Unique lowercase token for isolating rows between runs
pub fn marker() -> String {
    Uuid::new_v4().simple().to_string()
}

pub async fn insert_user(pool: &PgPool) -> i64 {
    let token = marker();
    sqlx::query_scalar(
        "INSERT INTO users (email, username, password_hash) VALUES ($1, $2, 'x') RETURNING id",
    )
    .bind(format!("{}@example.test", token))
    .bind(token)
    .fetch_one(pool)
    .await
    .expect("user inserted")
}

pub fn new_workout(title: &str, is_private: bool, price: f64, exercises: &[&str]) -> CreateWorkoutRequest {
    CreateWorkoutRequest {
        title: title.to_string(),
        description: String::new(),
        is_private,
        price,
        exercises: exercises.iter().map(|e| e.to_string()).collect(),
    }
}
