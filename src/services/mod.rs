//! Request-level operations
//!
//! Services check who may do what, call the repositories and shape the
//! result. They hold repositories behind trait objects so the same code runs
//! against PostgreSQL and against in-memory doubles.

mod exercises;
mod users;
mod workouts;

pub use exercises::ExerciseService;
pub use users::UserService;
pub use workouts::WorkoutService;

use crate::errors::ServiceError;

/// Trim a required text field, rejecting blank input
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::bad_request(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_price(price: f64) -> Result<(), ServiceError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ServiceError::bad_request("price must be a non-negative number"));
    }
    Ok(())
}

/// Exercise names as given, trimmed; at least one and none blank
pub(crate) fn exercise_names(names: &[String]) -> Result<Vec<String>, ServiceError> {
    if names.is_empty() {
        return Err(ServiceError::bad_request("at least one exercise is required"));
    }
    names
        .iter()
        .map(|name| required_text("exercise name", name))
        .collect()
}
