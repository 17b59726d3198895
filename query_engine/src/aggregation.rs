/// Represents SQL aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// COUNT(*) or COUNT(field)
    Count,
    /// COUNT(DISTINCT field)
    CountDistinct,
}

impl AggregateFunction {
    pub fn to_sql(&self) -> &'static str {
        "COUNT"
    }

    pub fn is_distinct(&self) -> bool {
        matches!(self, AggregateFunction::CountDistinct)
    }
}

/// Represents a field selection in a SELECT clause
#[derive(Debug, Clone, PartialEq)]
pub enum SelectField {
    /// `field`
    Field(String),
    /// `COUNT(...) [AS alias]`
    Aggregate {
        function: AggregateFunction,
        field: Option<String>, // None for COUNT(*)
        alias: Option<String>,
    },
}

impl SelectField {
    pub fn field(field: impl Into<String>) -> Self {
        SelectField::Field(field.into())
    }

    pub fn count_all() -> Self {
        SelectField::Aggregate {
            function: AggregateFunction::Count,
            field: None,
            alias: None,
        }
    }

    /// `COUNT(field) AS alias`; NULLs from an outer join are not counted
    pub fn count_as(field: impl Into<String>, alias: impl Into<String>) -> Self {
        SelectField::Aggregate {
            function: AggregateFunction::Count,
            field: Some(field.into()),
            alias: Some(alias.into()),
        }
    }

    pub fn count_distinct(field: impl Into<String>) -> Self {
        SelectField::Aggregate {
            function: AggregateFunction::CountDistinct,
            field: Some(field.into()),
            alias: None,
        }
    }

    /// Name an aggregate. Plain fields keep their column name.
    pub fn with_alias(mut self, name: impl Into<String>) -> Self {
        if let SelectField::Aggregate { alias, .. } = &mut self {
            *alias = Some(name.into());
        }
        self
    }

    pub fn to_sql(&self) -> String {
        match self {
            SelectField::Field(name) => name.clone(),
            SelectField::Aggregate {
                function,
                field,
                alias,
            } => {
                let argument = match (function.is_distinct(), field) {
                    (true, Some(f)) => format!("DISTINCT {}", f),
                    (_, Some(f)) => f.clone(),
                    (_, None) => "*".to_string(),
                };
                let aggregate = format!("{}({})", function.to_sql(), argument);

                match alias {
                    Some(alias) => format!("{} AS {}", aggregate, alias),
                    None => aggregate,
                }
            }
        }
    }
}
