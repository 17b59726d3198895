//! Binding of typed filter values onto sqlx statements

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{Query, QueryAs, QueryScalar};
use type_mapping::PostgresValue;

macro_rules! bind_postgres_value {
    ($query:expr, $value:expr) => {
        match $value {
            PostgresValue::Text(v) => $query.bind(v),
            PostgresValue::Integer(v) => $query.bind(v),
            PostgresValue::BigInt(v) => $query.bind(v),
            PostgresValue::Float(v) => $query.bind(v),
            PostgresValue::Boolean(v) => $query.bind(v),
            PostgresValue::Timestamp(v) => $query.bind(v),
            PostgresValue::Null => $query.bind(Option::<String>::None),
        }
    };
}

pub fn bind_values<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    values: &[PostgresValue],
) -> Query<'q, Postgres, PgArguments> {
    for value in values {
        query = bind_postgres_value!(query, value.clone());
    }
    query
}

pub fn bind_values_as<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: &[PostgresValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = bind_postgres_value!(query, value.clone());
    }
    query
}

pub fn bind_values_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    values: &[PostgresValue],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for value in values {
        query = bind_postgres_value!(query, value.clone());
    }
    query
}
