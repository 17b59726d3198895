//! Runtime values bound to parameterized statements

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PostgresValue {
    Text(String),
    Integer(i32),
    BigInt(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(chrono::DateTime<chrono::Utc>),
    Null,
}

impl PostgresValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PostgresValue::Null)
    }

    /// PostgreSQL type name, used in debug output only
    pub fn pg_type_name(&self) -> &'static str {
        match self {
            PostgresValue::Text(_) => "TEXT",
            PostgresValue::Integer(_) => "INTEGER",
            PostgresValue::BigInt(_) => "BIGINT",
            PostgresValue::Float(_) => "DOUBLE PRECISION",
            PostgresValue::Boolean(_) => "BOOLEAN",
            PostgresValue::Timestamp(_) => "TIMESTAMPTZ",
            PostgresValue::Null => "NULL",
        }
    }
}

impl From<String> for PostgresValue {
    fn from(val: String) -> Self {
        PostgresValue::Text(val)
    }
}

impl From<&str> for PostgresValue {
    fn from(val: &str) -> Self {
        PostgresValue::Text(val.to_string())
    }
}

impl From<i32> for PostgresValue {
    fn from(val: i32) -> Self {
        PostgresValue::Integer(val)
    }
}

impl From<i64> for PostgresValue {
    fn from(val: i64) -> Self {
        PostgresValue::BigInt(val)
    }
}

impl From<f64> for PostgresValue {
    fn from(val: f64) -> Self {
        PostgresValue::Float(val)
    }
}

impl From<bool> for PostgresValue {
    fn from(val: bool) -> Self {
        PostgresValue::Boolean(val)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for PostgresValue {
    fn from(val: chrono::DateTime<chrono::Utc>) -> Self {
        PostgresValue::Timestamp(val)
    }
}

impl<T> From<Option<T>> for PostgresValue
where
    T: Into<PostgresValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => PostgresValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        assert_eq!(PostgresValue::from(Some(3_i64)), PostgresValue::BigInt(3));
        assert!(PostgresValue::from(None::<String>).is_null());
    }
}
