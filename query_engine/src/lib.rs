//! Query Engine - filtered listing queries for FitHaus
//!
//! Turns raw client parameters into structured filters and pagination, then
//! into a pair of parameterized statements (total count and page) that share
//! one predicate. Nothing in this crate performs I/O.

/// Query tracing that only compiles in with the `debug-logging` feature
#[cfg(feature = "debug-logging")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub mod aggregation;
pub mod builder;
pub mod compiler;
pub mod condition;
pub mod errors;
pub mod filter;
pub mod join;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod table;
pub mod validation;


pub use aggregation::{AggregateFunction, SelectField};
pub use builder::{BuiltQuery, ListQuery, QueryPair};
pub use compiler::{FilterCompiler, QueryParams};
pub use condition::{QueryCondition, QueryFilter, QueryOperator};
pub use config::UnknownKeyPolicy;
pub use errors::QueryError;
pub use filter::{classify_key, FilterKey, Filters, OperatorKind};
pub use join::JoinClause;
pub use ordering::{ListOrder, SortOrder};
pub use pagination::Pagination;
pub use table::{ColumnSpec, TableSpec};
pub use type_mapping::{ColumnType, PostgresValue};
pub use validation::{ValidatedFieldName, ValidationError};
