/// Page selection for a listing; `limit == 0` means unpaginated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Every row on a single page
    pub fn unpaginated() -> Self {
        Self { page: 1, limit: 0 }
    }

    pub fn is_paginated(&self) -> bool {
        self.limit > 0
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// `LIMIT n OFFSET m`, or nothing when unpaginated
    pub fn to_sql(&self) -> String {
        if !self.is_paginated() {
            return String::new();
        }
        format!("LIMIT {} OFFSET {}", self.limit, self.offset())
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(2, 5).offset(), 5);
        assert_eq!(Pagination::new(4, 25).offset(), 75);
    }

    #[test]
    fn test_zero_limit_has_no_clause() {
        assert_eq!(Pagination::new(3, 0).to_sql(), "");
        assert_eq!(Pagination::unpaginated().to_sql(), "");
    }

    #[test]
    fn test_clause() {
        assert_eq!(Pagination::new(2, 5).to_sql(), "LIMIT 5 OFFSET 5");
    }

    #[test]
    fn test_large_page_does_not_overflow() {
        let pagination = Pagination::new(u32::MAX, u32::MAX);
        assert_eq!(
            pagination.offset(),
            u64::from(u32::MAX - 1) * u64::from(u32::MAX)
        );
    }
}
