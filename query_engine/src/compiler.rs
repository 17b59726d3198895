//! Filter Compiler: raw listing parameters to filters and pagination

use crate::errors::QueryError;
use crate::filter::Filters;
use crate::pagination::Pagination;
use config::QueryConfig;

const PAGE_KEY: &str = "page";
const LIMIT_KEY: &str = "limit";
/// OFFSET is a bigint on the server
const MAX_OFFSET: u64 = i64::MAX as u64;

/// The structured form of a listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub filters: Filters,
    pub pagination: Pagination,
}

impl QueryParams {
    /// No client filters, every row
    pub fn unpaginated() -> Self {
        Self {
            filters: Filters::new(),
            pagination: Pagination::unpaginated(),
        }
    }
}

/// Turns query-string parameters into [`QueryParams`]. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    default_limit: u32,
}

impl FilterCompiler {
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            default_limit: config.default_limit,
        }
    }

    pub fn with_default_limit(default_limit: u32) -> Self {
        Self { default_limit }
    }

    /// Compile an ordered list of key/value pairs.
    ///
    /// `page` and `limit` must be integers of at least 1. Any other key becomes
    /// a filter; when a key repeats only its first value is used.
    pub fn compile<I, K, V>(&self, params: I) -> Result<QueryParams, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = Filters::new();
        let mut page = None;
        let mut limit = None;

        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                PAGE_KEY => {
                    if page.is_none() {
                        page = Some(parse_positive(value).ok_or_else(QueryError::invalid_page)?);
                    }
                }
                LIMIT_KEY => {
                    if limit.is_none() {
                        limit =
                            Some(parse_positive(value).ok_or_else(QueryError::invalid_limit)?);
                    }
                }
                _ => {
                    if !filters.insert(key, value) {
                        debug_log!(key, "ignoring repeated filter key");
                    }
                }
            }
        }

        let pagination = Pagination::new(page.unwrap_or(1), limit.unwrap_or(self.default_limit));
        if pagination.offset() > MAX_OFFSET {
            return Err(QueryError::invalid_page());
        }
        debug_log!(
            filters = filters.len(),
            page = pagination.page,
            limit = pagination.limit,
            "compiled listing parameters"
        );

        Ok(QueryParams {
            filters,
            pagination,
        })
    }
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::new(&QueryConfig::default())
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n >= 1)
}
