/// Number of pages needed for `count` items; zero items means zero pages.
pub fn total_pages(count: usize, per_page: usize) -> usize {
    if per_page == 0 { 0 } else { count.div_ceil(per_page) }
}

/// Clamps `page` into `[0, max(total_pages - 1, 0)]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages.saturating_sub(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    per_page: usize,
    total_pages: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self { page: 0, per_page: per_page.max(1), total_pages: 0 }
    }

    pub fn page(&self) -> usize { self.page }

    pub fn per_page(&self) -> usize { self.per_page }

    pub fn total_pages(&self) -> usize { self.total_pages }

    pub fn offset(&self) -> usize { self.page * self.per_page }

    /// Recomputes the page count and clamps the current page into it.
    pub fn set_total_items(&mut self, count: usize) {
        self.total_pages = total_pages(count, self.per_page);
        self.page = clamp_page(self.page, self.total_pages);
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = clamp_page(page, self.total_pages);
    }

    pub fn has_prev(&self) -> bool { self.page > 0 && self.total_pages > 1 }

    pub fn has_next(&self) -> bool { self.page + 1 < self.total_pages }

    pub fn prev_page(&self) -> Option<usize> { self.has_prev().then(|| self.page - 1) }

    pub fn next_page(&self) -> Option<usize> { self.has_next().then(|| self.page + 1) }
}
