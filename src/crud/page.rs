//! Page envelope for paginated listings

use serde::Serialize;

use crate::builder::PageWindow;

/// One page of results plus totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T: Serialize> Page<T> {
    /// Build the envelope for `items` fetched through `window`.
    ///
    /// Every field comes from the page view (`page`, `per_page`), also in
    /// limit/offset mode where `page` is the page holding `offset`. With
    /// `total == 0` there are no pages and no neighbours.
    pub fn new(items: Vec<T>, total: u64, window: PageWindow) -> Self {
        let per_page = window.per_page.max(1);
        if total == 0 {
            return Self {
                items,
                total,
                page: window.page,
                per_page,
                total_pages: 0,
                has_next: false,
                has_prev: false,
            };
        }
        Self {
            items,
            total,
            page: window.page,
            per_page,
            total_pages: total.div_ceil(per_page),
            has_next: window.page.saturating_mul(per_page) < total,
            has_prev: window.page > 1,
        }
    }

    /// Transform the items, keeping the totals
    pub fn map<U: Serialize, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowed::PageLimits;
    use crate::query::Pagination;

    fn window(page: u64, per_page: u64) -> PageWindow {
        PageWindow::resolve(&Pagination::page(page, per_page), PageLimits::default())
    }

    #[test]
    fn test_empty_total() {
        let page: Page<u32> = Page::new(vec![], 0, window(3, 10));
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn test_middle_page() {
        let page = Page::new(vec![1, 2], 5, window(2, 2));
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_last_page_exact_fit() {
        let page = Page::new(vec![1, 2], 4, window(2, 2));
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_offset_window_uses_page_view() {
        let window = PageWindow::resolve(&Pagination::limit_offset(10, 5), PageLimits::default());
        let page = Page::new(vec![0; 7], 12, window);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn test_first_page() {
        let page = Page::new(vec![1], 1, window(1, 2)).map(|n| n * 10);
        assert_eq!(page.items, vec![10]);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }
}
