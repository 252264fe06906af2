//! Offset-based page window and stable selection index.
//!
//! Both types only do index arithmetic over counts supplied by the caller.
//! They never own records; fetching is delegated through closures.

use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    page_size: usize,
    /// Offset of the first row on the current page; always a multiple of `page_size`
    first_item: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            first_item: 0,
        }
    }
}

impl PageWindow {
    pub fn new(page_size: usize) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            page_size,
            first_item: 0,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_offset(&self) -> usize {
        self.first_item
    }

    /// Zero-based page number.
    pub fn page_index(&self) -> usize {
        self.first_item / self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.first_item + self.page_size < total
    }

    pub fn has_previous(&self) -> bool {
        self.first_item > 0
    }

    /// Move one page forward. No-op when already on the last page.
    pub fn advance(&mut self, total: usize) {
        if self.has_next(total) {
            self.first_item += self.page_size;
        }
    }

    /// Move one page back, clamping at the first page.
    pub fn retreat(&mut self) {
        self.first_item = self.first_item.saturating_sub(self.page_size);
    }

    /// Half-open range of absolute indices covered by the current page.
    pub fn range(&self, total: usize) -> Range<usize> {
        let end = (self.first_item + self.page_size).min(total);
        self.first_item..end.max(self.first_item)
    }

    pub fn fetch_page<T, E, F>(&self, total: usize, fetch_range: F) -> Result<Vec<T>, E>
    where
        F: FnOnce(usize, usize) -> Result<Vec<T>, E>,
    {
        let range = self.range(total);
        fetch_range(range.start, range.end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: Option<usize>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    /// Bring the selection and the window back in range after rows were removed,
    /// then fetch whatever row the selection now points at.
    ///
    /// Must run after the store mutation, with the index captured before it.
    pub fn reconcile_after_deletion<T, E, F>(
        &mut self,
        new_total: usize,
        fetch_one: F,
        window: &mut PageWindow,
    ) -> Result<Option<T>, E>
    where
        F: FnOnce(usize) -> Result<Option<T>, E>,
    {
        if let Some(index) = self.selected
            && index >= new_total
        {
            self.selected = new_total.checked_sub(1);
        }
        if window.current_offset() >= new_total {
            window.retreat();
        }
        match self.selected {
            Some(index) => fetch_one(index),
            None => Ok(None),
        }
    }
}
