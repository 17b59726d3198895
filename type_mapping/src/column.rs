//! Column kinds and text parsing
//!
//! Maps the PostgreSQL column types the listing engine knows about onto the
//! parsing rule for client-supplied filter text.

use crate::types::PostgresValue;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Float,
    Boolean,
    Text,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, got '{raw}'")]
pub struct ParseValueError {
    pub expected: &'static str,
    pub raw: String,
}

impl ColumnType {
    /// PostgreSQL type used in DDL
    pub fn pg_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMPTZ",
        }
    }

    /// Whether `>=` / `<=` make sense for this column
    pub fn is_orderable(&self) -> bool {
        !matches!(self, ColumnType::Boolean)
    }

    /// Whether substring matching makes sense for this column
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Text)
    }

    /// Parse client-supplied text into a value of this column's type
    pub fn parse_value(&self, raw: &str) -> Result<PostgresValue, ParseValueError> {
        let trimmed = raw.trim();
        let fail = |expected: &'static str| ParseValueError {
            expected,
            raw: raw.to_string(),
        };

        match self {
            ColumnType::Integer => trimmed
                .parse::<i32>()
                .map(PostgresValue::Integer)
                .map_err(|_| fail("an integer")),
            ColumnType::BigInt => trimmed
                .parse::<i64>()
                .map(PostgresValue::BigInt)
                .map_err(|_| fail("an integer")),
            ColumnType::Float => match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(PostgresValue::Float(value)),
                _ => Err(fail("a number")),
            },
            ColumnType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" | "t" => Ok(PostgresValue::Boolean(true)),
                "false" | "0" | "f" => Ok(PostgresValue::Boolean(false)),
                _ => Err(fail("a boolean")),
            },
            ColumnType::Text => Ok(PostgresValue::Text(raw.to_string())),
            ColumnType::Timestamp => parse_timestamp(trimmed)
                .map(PostgresValue::Timestamp)
                .ok_or_else(|| fail("an RFC 3339 timestamp or YYYY-MM-DD date")),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
