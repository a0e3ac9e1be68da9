//! Pagination for list and search endpoints

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Sanitized page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-indexed
    pub page: i64,
    pub limit: i64,
    /// Offset for SQL LIMIT/OFFSET
    pub offset: i64,
}

impl PageWindow {
    /// Page floored at 1, limit clamped to `[1, MAX_LIMIT]`
    ///
    /// ```
    /// use schematic_api::pagination::PageWindow;
    ///
    /// let w = PageWindow::new(3, 25);
    /// assert_eq!(w.offset, 50);
    ///
    /// let w = PageWindow::new(-4, 1000);
    /// assert_eq!((w.page, w.limit, w.offset), (1, 100, 0));
    /// ```
    pub fn new(page: i64, limit: i64) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_LIMIT);
        Self {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }

    /// Response metadata for a result set of `total` rows
    pub fn meta(&self, total: i64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total_pages(total, self.limit),
        }
    }
}

impl From<PageQuery> for PageWindow {
    fn from(query: PageQuery) -> Self {
        PageWindow::new(query.page, query.limit)
    }
}

/// `pagination` object of list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// `ceil(total / limit)`
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_normal() {
        let w = PageWindow::new(2, 20);
        assert_eq!(w.page, 2);
        assert_eq!(w.limit, 20);
        assert_eq!(w.offset, 20);
    }

    #[test]
    fn test_window_floors_page() {
        let w = PageWindow::new(0, 20);
        assert_eq!(w.page, 1);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn test_window_clamps_limit() {
        assert_eq!(PageWindow::new(1, 0).limit, 1);
        assert_eq!(PageWindow::new(1, -5).limit, 1);
        assert_eq!(PageWindow::new(1, 500).limit, 100);
    }

    #[test]
    fn test_page_past_end_is_kept() {
        // Requesting past the last page returns an empty slice, not the last page
        let w = PageWindow::new(9, 10);
        let meta = w.meta(25);
        assert_eq!(meta.page, 9);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let json = serde_json::to_value(PageWindow::new(1, 20).meta(41)).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["total"], 41);
    }
}
