use crate::table::TableSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Named listing orders. Every order ends on the primary key so pages are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Insertion order
    #[default]
    Identity,
    /// Highest `likes_count` first, ties by identity
    MostLiked,
}

impl ListOrder {
    /// Select alias carrying the like count
    pub const LIKES_ALIAS: &'static str = "likes_count";

    pub fn order_by(&self, table: &TableSpec) -> Vec<(String, SortOrder)> {
        let identity = (table.qualified_primary_key(), SortOrder::Asc);
        match self {
            ListOrder::Identity => vec![identity],
            ListOrder::MostLiked => vec![(Self::LIKES_ALIAS.to_string(), SortOrder::Desc), identity],
        }
    }
}
