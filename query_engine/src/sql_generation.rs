//! SQL fragment generation
//!
//! Every value reaches the statement as a `$n` placeholder; only identifiers
//! from table specs, validated pass-through keys and integer page bounds are
//! written into the SQL text.

use crate::aggregation::SelectField;
use crate::condition::{QueryCondition, QueryFilter, QueryOperator};
use crate::join::JoinClause;
use crate::ordering::SortOrder;
use type_mapping::PostgresValue;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build a WHERE clause from top-level conditions joined with AND.
    /// Placeholders are numbered from `$1`.
    pub fn build_where_clause(conditions: &[QueryFilter]) -> (String, Vec<PostgresValue>) {
        let mut values = Vec::new();
        let mut param_counter = 1;

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values, &mut param_counter))
            .filter(|sql| !sql.is_empty())
            .collect::<Vec<_>>()
            .join(" AND ");

        if conditions_sql.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", conditions_sql), values)
        }
    }

    fn build_condition_sql(
        filter: &QueryFilter,
        values: &mut Vec<PostgresValue>,
        param_counter: &mut usize,
    ) -> String {
        match filter {
            QueryFilter::Condition(condition) => {
                Self::build_single_condition_sql(condition, values, param_counter)
            }
            QueryFilter::AnyOf(filters) => {
                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, values, param_counter))
                    .filter(|sql| !sql.is_empty())
                    .collect::<Vec<_>>();

                match group_conditions.len() {
                    0 => String::new(),
                    1 => group_conditions.concat(),
                    _ => format!("({})", group_conditions.join(" OR ")),
                }
            }
        }
    }

    fn build_single_condition_sql(
        condition: &QueryCondition,
        values: &mut Vec<PostgresValue>,
        param_counter: &mut usize,
    ) -> String {
        let field = &condition.field;

        let value = match (&condition.operator, &condition.value) {
            (QueryOperator::IsNull, _) | (QueryOperator::Eq, None) => {
                return format!("{} IS NULL", field);
            }
            (_, None) => return "1=0".to_string(),
            (_, Some(value)) => value,
        };

        values.push(value.clone());
        let param = format!("${}", param_counter);
        *param_counter += 1;

        match condition.operator {
            QueryOperator::Eq => format!("{} = {}", field, param),
            QueryOperator::Gte => format!("{} >= {}", field, param),
            QueryOperator::Lte => format!("{} <= {}", field, param),
            QueryOperator::LikeLower => format!("LOWER({}) LIKE {}", field, param),
            QueryOperator::IsNull => format!("{} IS NULL", field),
        }
    }

    pub fn build_order_clause(order_by: &[(String, SortOrder)]) -> String {
        if order_by.is_empty() {
            return String::new();
        }

        let order_items: Vec<String> = order_by
            .iter()
            .map(|(field, order)| format!("{} {}", field, order.to_sql()))
            .collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    pub fn build_select_clause(fields: &[SelectField]) -> String {
        if fields.is_empty() {
            return "*".to_string();
        }

        fields
            .iter()
            .map(SelectField::to_sql)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn build_join_clause(joins: &[JoinClause]) -> String {
        joins
            .iter()
            .map(JoinClause::to_sql)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn build_group_by_clause(group_by: &[String]) -> String {
        if group_by.is_empty() {
            String::new()
        } else {
            format!("GROUP BY {}", group_by.join(", "))
        }
    }

    /// Join non-empty clauses with single spaces
    pub fn assemble(parts: &[&str]) -> String {
        parts
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
