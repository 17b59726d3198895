//! Filter key classification and the compiled filter set

use std::collections::btree_map::{self, BTreeMap};

/// The comparison a filter key asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatorKind {
    /// `<field>=value`
    Eq,
    /// `min_<field>=value`
    Gte,
    /// `max_<field>=value`
    Lte,
    /// `like_<field>=value`, case-insensitive substring
    Fuzzy,
}

impl OperatorKind {
    pub fn describe(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "equality",
            OperatorKind::Gte | OperatorKind::Lte => "range comparison",
            OperatorKind::Fuzzy => "fuzzy match",
        }
    }
}

/// A raw parameter key split into target field and operator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterKey {
    pub field: String,
    pub operator: OperatorKind,
}

/// Classify a raw parameter key by its prefix.
///
/// A bare prefix such as `min_` has no field to apply to and is treated as an
/// equality key named `min_`.
pub fn classify_key(key: &str) -> FilterKey {
    const PREFIXES: [(&str, OperatorKind); 3] = [
        ("min_", OperatorKind::Gte),
        ("max_", OperatorKind::Lte),
        ("like_", OperatorKind::Fuzzy),
    ];

    for (prefix, operator) in PREFIXES {
        if let Some(field) = key.strip_prefix(prefix) {
            if !field.is_empty() {
                return FilterKey {
                    field: field.to_string(),
                    operator,
                };
            }
        }
    }

    FilterKey {
        field: key.to_string(),
        operator: OperatorKind::Eq,
    }
}

/// One client-supplied filter, keeping the original key for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub key: String,
    pub value: String,
}

/// Compiled filters: field -> operator -> value.
///
/// Entries iterate in field then operator order regardless of the order they
/// were inserted in, so the same parameter map always yields the same
/// predicate text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    entries: BTreeMap<FilterKey, FilterEntry>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw key/value pair. Returns false and keeps the existing value
    /// when the same field and operator were already supplied.
    pub fn insert(&mut self, key: &str, value: &str) -> bool {
        match self.entries.entry(classify_key(key)) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(FilterEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                });
                true
            }
        }
    }

    pub fn get(&self, field: &str, operator: OperatorKind) -> Option<&str> {
        self.entries
            .get(&FilterKey {
                field: field.to_string(),
                operator,
            })
            .map(|entry| entry.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterKey, &FilterEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
