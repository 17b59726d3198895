//! Error types for the FitHaus crate
//!
//! Every error a service returns maps to a [`StatusClass`] and a short client
//! message. Store and driver detail stays in `Display` for the logs and never
//! reaches [`ServiceError::client_message`].

use crate::collaborators::CollaboratorError;
use config::ConfigError;
use query_engine::QueryError;
use store_object::StoreError;
use task_queue::QueueError;
use thiserror::Error;

/// Startup and maintenance failures of the FitHaus process itself
#[derive(Error, Debug)]
pub enum FitHausError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// HTTP-style outcome class of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Unavailable,
    Internal,
}

impl StatusClass {
    pub fn http_status(&self) -> u16 {
        match self {
            StatusClass::BadRequest => 400,
            StatusClass::Unauthorized => 401,
            StatusClass::Forbidden => 403,
            StatusClass::NotFound => 404,
            StatusClass::Conflict => 409,
            StatusClass::Unavailable => 503,
            StatusClass::Internal => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        ServiceError::NotFound(entity.into())
    }

    pub fn status(&self) -> StatusClass {
        match self {
            ServiceError::BadRequest(_) => StatusClass::BadRequest,
            ServiceError::Unauthenticated => StatusClass::Unauthorized,
            ServiceError::Forbidden(_) => StatusClass::Forbidden,
            ServiceError::NotFound(_) => StatusClass::NotFound,
            ServiceError::Conflict(_) => StatusClass::Conflict,
            ServiceError::Unavailable(_) => StatusClass::Unavailable,
            ServiceError::Internal(_) => StatusClass::Internal,
        }
    }

    /// Text safe to show a client
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::BadRequest(message)
            | ServiceError::Forbidden(message)
            | ServiceError::Conflict(message) => message.clone(),
            ServiceError::Unauthenticated => "unauthenticated".to_string(),
            ServiceError::NotFound(entity) => format!("{} not found", entity),
            ServiceError::Unavailable(_) => "service temporarily unavailable, retry later".to_string(),
            ServiceError::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl From<QueryError> for ServiceError {
    fn from(error: QueryError) -> Self {
        ServiceError::BadRequest(error.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity } => ServiceError::NotFound(entity.to_string()),
            StoreError::Conflict { table } => {
                tracing::debug!(table, "uniqueness violation");
                ServiceError::Conflict("resource already exists".to_string())
            }
            StoreError::ForeignKeyViolation { table } => {
                tracing::debug!(table, "foreign key violation");
                ServiceError::BadRequest("referenced resource does not exist".to_string())
            }
            StoreError::Query(query_error) => query_error.into(),
            error @ StoreError::Unavailable { .. } => {
                tracing::warn!(error = %error, "store unavailable");
                ServiceError::Unavailable(error.to_string())
            }
            error @ StoreError::Database { .. } => {
                tracing::error!(error = %error, "store failure");
                ServiceError::Internal(error.to_string())
            }
        }
    }
}

impl From<QueueError> for ServiceError {
    fn from(error: QueueError) -> Self {
        tracing::warn!(error = %error, "generation queue rejected job");
        ServiceError::Unavailable(error.to_string())
    }
}

impl From<CollaboratorError> for ServiceError {
    fn from(error: CollaboratorError) -> Self {
        match error {
            CollaboratorError::Unauthenticated => ServiceError::Unauthenticated,
            other => {
                tracing::error!(error = %other, "collaborator failure");
                ServiceError::Internal(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_detail_never_reaches_client() {
        let error: ServiceError = StoreError::Database {
            table: "workouts",
            operation: "list",
            source: sqlx::Error::Protocol("relation \"workouts\" does not exist".to_string()),
        }
        .into();

        assert_eq!(error.status(), StatusClass::Internal);
        assert_eq!(error.client_message(), "internal server error");
        assert!(error.to_string().contains("workouts"));
    }

    #[test]
    fn test_store_taxonomy_mapping() {
        let cases: Vec<(StoreError, StatusClass)> = vec![
            (StoreError::not_found("workout"), StatusClass::NotFound),
            (StoreError::Conflict { table: "users" }, StatusClass::Conflict),
            (
                StoreError::ForeignKeyViolation { table: "workout_likes" },
                StatusClass::BadRequest,
            ),
            (StoreError::timed_out("workouts.copy"), StatusClass::Unavailable),
            (QueryError::invalid_page().into(), StatusClass::BadRequest),
        ];

        for (store_error, expected) in cases {
            assert_eq!(ServiceError::from(store_error).status(), expected);
        }
    }

    #[test]
    fn test_bad_input_message_names_key() {
        let error = ServiceError::from(QueryError::invalid_limit());
        assert_eq!(error.client_message(), "invalid limit number");
    }

    #[test]
    fn test_queue_full_is_retryable() {
        let error = ServiceError::from(QueueError::Full { capacity: 4 });
        assert_eq!(error.status(), StatusClass::Unavailable);
        assert_eq!(error.status().http_status(), 503);
    }
}
