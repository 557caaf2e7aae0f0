//! Pagination window resolution
//!
//! Exactly one pagination mode is honored per request. Page-based
//! parameters win over limit/offset; with neither, the configured default
//! limit bounds the query. Requested sizes above the maximum are clamped.

use serde::Serialize;

use crate::allowed::PageLimits;
use crate::query::Pagination;

/// Which request parameters produced the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    Page,
    Offset,
    Default,
}

/// Resolved limit/offset plus the page view of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
    /// 1-based page containing `offset`
    pub page: u64,
    pub per_page: u64,
    pub mode: WindowMode,
}

impl PageWindow {
    pub fn resolve(pagination: &Pagination, limits: PageLimits) -> Self {
        if pagination.is_page_based() {
            let per_page = clamp(pagination.per_page.unwrap_or(limits.default_limit), limits);
            let page = pagination.page.unwrap_or(1).max(1);
            if pagination.is_offset_based() {
                tracing::debug!(page, per_page, "page parameters take precedence over limit/offset");
            }
            return Self {
                limit: per_page,
                offset: (page - 1).saturating_mul(per_page),
                page,
                per_page,
                mode: WindowMode::Page,
            };
        }

        if pagination.is_offset_based() {
            let limit = clamp(pagination.limit.unwrap_or(limits.default_limit), limits);
            let offset = pagination.offset.unwrap_or(0);
            return Self {
                limit,
                offset,
                page: offset / limit + 1,
                per_page: limit,
                mode: WindowMode::Offset,
            };
        }

        let limit = clamp(limits.default_limit, limits);
        Self {
            limit,
            offset: 0,
            page: 1,
            per_page: limit,
            mode: WindowMode::Default,
        }
    }
}

fn clamp(requested: u64, limits: PageLimits) -> u64 {
    let max = limits.max_limit.max(1);
    let limit = requested.clamp(1, max);
    if limit != requested {
        tracing::debug!(requested, limit, "clamped page size");
    }
    limit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> PageLimits {
        PageLimits {
            default_limit: 20,
            max_limit: 50,
        }
    }

    #[test]
    fn test_page_wins_over_limit_offset() {
        let pagination = Pagination {
            page: Some(2),
            per_page: Some(10),
            limit: Some(5),
            offset: Some(0),
        };
        let window = PageWindow::resolve(&pagination, limits());
        assert_eq!((window.limit, window.offset), (10, 10));
        assert_eq!(window.mode, WindowMode::Page);
    }

    #[test]
    fn test_partial_page_parameters() {
        let only_page = Pagination {
            page: Some(3),
            ..Default::default()
        };
        let window = PageWindow::resolve(&only_page, limits());
        assert_eq!((window.limit, window.offset), (20, 40));

        let only_per_page = Pagination {
            per_page: Some(5),
            ..Default::default()
        };
        let window = PageWindow::resolve(&only_per_page, limits());
        assert_eq!((window.page, window.offset), (1, 0));
    }

    #[test]
    fn test_limit_offset() {
        let window = PageWindow::resolve(&Pagination::limit_offset(10, 25), limits());
        assert_eq!((window.limit, window.offset), (10, 25));
        assert_eq!(window.page, 3);
        assert_eq!(window.mode, WindowMode::Offset);
    }

    #[test]
    fn test_default_bound() {
        let window = PageWindow::resolve(&Pagination::default(), limits());
        assert_eq!((window.limit, window.offset, window.page), (20, 0, 1));
        assert_eq!(window.mode, WindowMode::Default);
    }

    #[test]
    fn test_clamped_to_max() {
        let window = PageWindow::resolve(&Pagination::page(1, 500), limits());
        assert_eq!(window.per_page, 50);
    }
}
