use crate::validation::ValidationError;
use thiserror::Error;
use type_mapping::ParseValueError;

/// Malformed listing input. Every variant is a client error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("invalid {key} number")]
    InvalidPagination { key: &'static str },

    #[error("unknown filter key: {0}")]
    UnknownFilterKey(String),

    #[error("filter '{key}' does not support {operator}")]
    UnsupportedOperator { key: String, operator: &'static str },

    #[error("invalid value for filter '{key}': {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: ParseValueError,
    },

    #[error("invalid filter key '{key}': {source}")]
    InvalidIdentifier {
        key: String,
        #[source]
        source: ValidationError,
    },
}

impl QueryError {
    pub fn invalid_page() -> Self {
        Self::InvalidPagination { key: "page" }
    }

    pub fn invalid_limit() -> Self {
        Self::InvalidPagination { key: "limit" }
    }
}
