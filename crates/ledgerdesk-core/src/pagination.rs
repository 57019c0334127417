//! Client-side pagination over the filtered collection

use std::ops::Range;

/// Number of pages needed for `count` rows
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Clamp a page number into `[1, max(total_pages, 1)]`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Current page (1-indexed) and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    current_page: usize,
    page_size: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Move to page `n`; ignored (returns false) when out of range
    pub fn go_to(&mut self, n: usize, total_pages: usize) -> bool {
        if n < 1 || n > total_pages {
            return false;
        }
        self.current_page = n;
        true
    }

    /// Change the page size and return to page 1; zero is ignored
    pub fn set_page_size(&mut self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        self.page_size = n;
        self.current_page = 1;
        true
    }

    /// Step back one page, never below 1
    pub fn step_back(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// Pull the current page back into range after the row count changed
    pub fn clamp(&mut self, total_pages: usize) {
        self.current_page = clamp_page(self.current_page, total_pages);
    }

    /// Index range of the current page within `len` rows
    pub fn window(&self, len: usize) -> Range<usize> {
        let page = clamp_page(self.current_page, total_pages(len, self.page_size));
        let start = ((page - 1) * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }
}
