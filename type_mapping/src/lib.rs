//! Unified type mapping between client-supplied text and PostgreSQL values
//!
//! Listing filters arrive as strings. Every filterable column declares a
//! [`ColumnType`], and the raw text is parsed into a typed [`PostgresValue`]
//! before it is bound to a statement, so comparisons happen in the column's
//! own domain rather than as text.

pub mod column;
pub mod types;

pub use column::{ColumnType, ParseValueError};
pub use types::PostgresValue;
