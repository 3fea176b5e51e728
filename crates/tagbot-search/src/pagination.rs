//! Offset-token pagination for inline results.

use tagbot_core::defaults;

/// Zero-based page of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, defaults::INLINE_PAGE_SIZE)
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Page from the transport's opaque offset token.
    ///
    /// An empty or unreadable token means the first page.
    pub fn from_token(token: &str, page_size: u32) -> Self {
        let page = token.trim().parse().unwrap_or(0);
        Self::new(page, page_size)
    }

    /// Index of the first hit on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Token for the following page, if more hits remain after this one.
    pub fn next_token(&self, total: u64) -> Option<String> {
        let end = self.offset() + u64::from(self.page_size);
        (end < total).then(|| (self.page + 1).to_string())
    }
}
