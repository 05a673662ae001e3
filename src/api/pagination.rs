use crate::schemas::result::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A 1-based page request clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) page: i64,
    pub(crate) limit: i64,
}

impl PageWindow {
    pub(crate) fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|page| *page >= 1).unwrap_or(1);
        let limit = match limit {
            Some(limit) if limit >= 1 => limit.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, limit }
    }

    pub(crate) fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub(crate) fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}
