//! Query Builder: one predicate, two statements
//!
//! [`ListQuery::build`] resolves the compiled filters against the table's
//! allow-list, combines them with the required predicates (visibility, soft
//! delete) and renders that WHERE clause exactly once. The count and the page
//! statement are both assembled from that single rendering, so they always
//! select the same rows.

use crate::aggregation::SelectField;
use crate::compiler::QueryParams;
use crate::condition::QueryFilter;
use crate::errors::QueryError;
use crate::filter::{FilterEntry, FilterKey, Filters, OperatorKind};
use crate::join::JoinClause;
use crate::ordering::ListOrder;
use crate::sql_generation::SqlGenerator;
use crate::table::TableSpec;
use crate::validation::ValidatedFieldName;
use config::UnknownKeyPolicy;
use type_mapping::PostgresValue;

/// Alias of the total in the count statement
pub const TOTAL_ALIAS: &str = "total";

/// SQL text plus its positional bind values
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub values: Vec<PostgresValue>,
}

/// The count statement and the page statement of one listing request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPair {
    pub count: BuiltQuery,
    pub page: BuiltQuery,
}

/// A listing over one base table with a fixed join shape
#[derive(Debug, Clone)]
pub struct ListQuery<'a> {
    table: &'a TableSpec,
    select: Vec<SelectField>,
    joins: Vec<JoinClause>,
    required: Vec<QueryFilter>,
    group_by: Vec<String>,
    order: ListOrder,
    unknown_keys: UnknownKeyPolicy,
}

impl<'a> ListQuery<'a> {
    pub fn new(table: &'a TableSpec) -> Self {
        Self {
            table,
            select: Vec::new(),
            joins: Vec::new(),
            required: Vec::new(),
            group_by: Vec::new(),
            order: ListOrder::default(),
            unknown_keys: UnknownKeyPolicy::default(),
        }
    }

    pub fn select(mut self, fields: Vec<SelectField>) -> Self {
        self.select = fields;
        self
    }

    pub fn join(mut self, join: JoinClause) -> Self {
        self.joins.push(join);
        self
    }

    /// A predicate every listed row must satisfy, independent of client filters
    pub fn require(mut self, filter: QueryFilter) -> Self {
        self.required.push(filter);
        self
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by.push(field.into());
        self
    }

    pub fn order(mut self, order: ListOrder) -> Self {
        self.order = order;
        self
    }

    pub fn unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Build the count and page statements for a compiled listing request
    pub fn build(&self, params: &QueryParams) -> Result<QueryPair, QueryError> {
        let (where_clause, values) = self.predicate(&params.filters)?;
        let from_clause = self.from_clause();

        let count = BuiltQuery {
            sql: SqlGenerator::assemble(&[
                "SELECT",
                &self.count_field().to_sql(),
                &from_clause,
                &where_clause,
            ]),
            values: values.clone(),
        };

        let order_clause = SqlGenerator::build_order_clause(&self.order.order_by(self.table));
        let page = BuiltQuery {
            sql: SqlGenerator::assemble(&[
                "SELECT",
                &SqlGenerator::build_select_clause(&self.select),
                &from_clause,
                &where_clause,
                &SqlGenerator::build_group_by_clause(&self.group_by),
                &order_clause,
                &params.pagination.to_sql(),
            ]),
            values,
        };

        debug_log!(
            table = self.table.name,
            count_sql = %count.sql,
            page_sql = %page.sql,
            binds = page.values.len(),
            "built listing queries"
        );

        Ok(QueryPair { count, page })
    }

    /// The shared WHERE clause: required predicates first, then client filters
    fn predicate(&self, filters: &Filters) -> Result<(String, Vec<PostgresValue>), QueryError> {
        let mut conditions = self.required.clone();
        for (key, entry) in filters.iter() {
            conditions.push(self.resolve(key, entry)?);
        }
        Ok(SqlGenerator::build_where_clause(&conditions))
    }

    fn resolve(&self, key: &FilterKey, entry: &FilterEntry) -> Result<QueryFilter, QueryError> {
        if self.table.is_hidden(&key.field) {
            return Err(QueryError::UnknownFilterKey(entry.key.clone()));
        }

        let Some(column) = self.table.column(&key.field) else {
            return self.resolve_unknown(key, entry);
        };
        let field = self.table.qualified(column.name);
        let column_type = column.column_type;

        let unsupported = || QueryError::UnsupportedOperator {
            key: entry.key.clone(),
            operator: key.operator.describe(),
        };
        let parse = |raw: &str| {
            column_type
                .parse_value(raw)
                .map_err(|source| QueryError::InvalidValue {
                    key: entry.key.clone(),
                    source,
                })
        };

        match key.operator {
            OperatorKind::Eq => Ok(QueryFilter::eq(field, parse(&entry.value)?)),
            OperatorKind::Gte if column_type.is_orderable() => {
                Ok(QueryFilter::gte(field, parse(&entry.value)?))
            }
            OperatorKind::Lte if column_type.is_orderable() => {
                Ok(QueryFilter::lte(field, parse(&entry.value)?))
            }
            OperatorKind::Fuzzy if column_type.is_textual() => {
                Ok(QueryFilter::contains_ignore_case(field, &entry.value))
            }
            _ => Err(unsupported()),
        }
    }

    /// Unknown keys are either rejected or compared as text on the base table
    fn resolve_unknown(&self, key: &FilterKey, entry: &FilterEntry) -> Result<QueryFilter, QueryError> {
        match self.unknown_keys {
            UnknownKeyPolicy::Reject => Err(QueryError::UnknownFilterKey(entry.key.clone())),
            UnknownKeyPolicy::PassThrough => {
                let name = ValidatedFieldName::new(&key.field).map_err(|source| {
                    QueryError::InvalidIdentifier {
                        key: entry.key.clone(),
                        source,
                    }
                })?;
                let field = self.table.qualified(name.as_str());
                let value = PostgresValue::Text(entry.value.clone());

                Ok(match key.operator {
                    OperatorKind::Eq => QueryFilter::eq(field, value),
                    OperatorKind::Gte => QueryFilter::gte(field, value),
                    OperatorKind::Lte => QueryFilter::lte(field, value),
                    OperatorKind::Fuzzy => QueryFilter::contains_ignore_case(field, &entry.value),
                })
            }
        }
    }

    fn from_clause(&self) -> String {
        SqlGenerator::assemble(&[
            "FROM",
            self.table.name,
            &SqlGenerator::build_join_clause(&self.joins),
        ])
    }

    /// Joins can repeat a base row, so the count is taken over distinct keys
    fn count_field(&self) -> SelectField {
        let count = if self.joins.is_empty() {
            SelectField::count_all()
        } else {
            SelectField::count_distinct(self.table.qualified_primary_key())
        };
        count.with_alias(TOTAL_ALIAS)
    }
}
