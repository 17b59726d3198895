//! Predicate trees for WHERE clauses

use type_mapping::PostgresValue;

/// Query condition operators
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Eq,        // =
    Gte,       // >=
    Lte,       // <=
    LikeLower, // LOWER(field) LIKE
    IsNull,    // IS NULL
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Option<PostgresValue>, // None for IS NULL
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    Condition(QueryCondition),
    /// Satisfied when any member is
    AnyOf(Vec<QueryFilter>),
}

impl QueryFilter {
    pub fn condition(
        field: impl Into<String>,
        operator: QueryOperator,
        value: Option<PostgresValue>,
    ) -> Self {
        Self::Condition(QueryCondition {
            field: field.into(),
            operator,
            value,
        })
    }

    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::AnyOf(filters)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Eq, Some(value.into()))
    }

    pub fn gte(field: impl Into<String>, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Gte, Some(value.into()))
    }

    pub fn lte(field: impl Into<String>, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Lte, Some(value.into()))
    }

    /// Case-insensitive substring match; `needle` is lower-cased and wrapped in `%`
    pub fn contains_ignore_case(field: impl Into<String>, needle: &str) -> Self {
        Self::condition(
            field,
            QueryOperator::LikeLower,
            Some(PostgresValue::Text(format!("%{}%", needle.to_lowercase()))),
        )
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::condition(field, QueryOperator::IsNull, None)
    }
}
