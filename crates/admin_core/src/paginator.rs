use std::{num::NonZeroUsize, ops::RangeInclusive};

use tracing::debug;

/// Derived view over a collection; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_size: NonZeroUsize,
    /// 1-based. Fixed at 1 when there are no pages.
    pub current_page: usize,
    pub total_pages: usize,
    /// Half-open index range of the visible slice.
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Client-side pagination over an ordered collection whose order is trusted as
/// given by the server.
#[derive(Debug, Clone)]
pub struct ListPaginator {
    page_size: NonZeroUsize,
    len: usize,
    current_page: usize,
    total_pages: usize,
}

impl ListPaginator {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            len: 0,
            current_page: 1,
            total_pages: 0,
        }
    }

    pub fn recompute(
        &mut self,
        len: usize,
        page_size: NonZeroUsize,
        requested_page: usize,
    ) -> PageWindow {
        self.len = len;
        self.page_size = page_size;
        self.total_pages = len.div_ceil(page_size.get());
        self.current_page = if self.total_pages == 0 {
            1
        } else {
            requested_page.clamp(1, self.total_pages)
        };
        self.window()
    }

    /// Recomputes against a replaced collection, keeping the current page when
    /// it still exists.
    pub fn refresh(&mut self, len: usize) -> PageWindow {
        self.recompute(len, self.page_size, self.current_page)
    }

    /// Returns `false` and leaves state untouched when `page` is out of range.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages {
            debug!(page, total_pages = self.total_pages, "ignoring out-of-range page");
            return false;
        }
        self.recompute(self.len, self.page_size, page);
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.current_page <= 1 {
            return false;
        }
        self.go_to_page(self.current_page - 1)
    }

    pub fn next(&mut self) -> bool {
        if self.current_page >= self.total_pages {
            return false;
        }
        self.go_to_page(self.current_page + 1)
    }

    pub fn window(&self) -> PageWindow {
        let size = self.page_size.get();
        let (start, end) = if self.total_pages == 0 {
            (0, 0)
        } else {
            let start = (self.current_page - 1) * size;
            (start, (start + size).min(self.len))
        };
        PageWindow {
            page_size: self.page_size,
            current_page: self.current_page,
            total_pages: self.total_pages,
            start,
            end,
        }
    }

    /// Page links to render, `1..=total_pages`; empty when there are no pages.
    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.total_pages
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let window = self.window();
        let end = window.end.min(items.len());
        let start = window.start.min(end);
        &items[start..end]
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }
}

#[cfg(test)]
#[path = "tests/paginator_tests.rs"]
mod tests;
