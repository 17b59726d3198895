//! Static descriptions of listable tables

use type_mapping::ColumnType;

/// One filterable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type }
    }
}

/// A listable base table and the allow-list of columns clients may filter on.
///
/// `hidden` columns can never be filtered, not even through the pass-through
/// policy for unknown keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [ColumnSpec],
    pub hidden: &'static [&'static str],
}

impl TableSpec {
    pub const fn new(
        name: &'static str,
        primary_key: &'static str,
        columns: &'static [ColumnSpec],
    ) -> Self {
        Self {
            name,
            primary_key,
            columns,
            hidden: &[],
        }
    }

    pub const fn with_hidden(mut self, hidden: &'static [&'static str]) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.iter().any(|hidden| hidden.eq_ignore_ascii_case(name))
    }

    /// `table.column`
    pub fn qualified(&self, column: &str) -> String {
        format!("{}.{}", self.name, column)
    }

    pub fn qualified_primary_key(&self) -> String {
        self.qualified(self.primary_key)
    }
}
