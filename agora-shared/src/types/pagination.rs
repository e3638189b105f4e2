use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u64,
}

fn default_page() -> u64 { 1 }

impl PageParams {
    pub fn new(page: u64) -> Self {
        Self { page }
    }

    /// Page numbers start at 1; 0 is treated as the first page.
    pub fn number(&self) -> u64 {
        self.page.max(1)
    }

    /// Row offset of this page, saturating at `i64::MAX` so an absurd page
    /// number reads as "past the end" instead of overflowing.
    pub fn offset(&self, page_size: u64) -> i64 {
        (self.number() - 1)
            .checked_mul(page_size)
            .and_then(|offset| i64::try_from(offset).ok())
            .unwrap_or(i64::MAX)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1 }
    }
}

/// One page of a list result with a fixed page size.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, params: &PageParams, page_size: u64) -> Self {
        let page_size = page_size.max(1);
        let page = params.number();
        let total_pages = count.div_ceil(page_size);
        Self {
            count,
            page,
            page_size,
            total_pages,
            next: (page < total_pages).then(|| page + 1),
            previous: (page > 1).then(|| (page - 1).min(total_pages.max(1))),
            results,
        }
    }

    pub fn empty(params: &PageParams, page_size: u64) -> Self {
        Self::new(Vec::new(), 0, params, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn links_follow_page_position() {
        let page = Page::new(vec![1, 2, 3], 23, &PageParams::new(2), 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));

        let last = Page::new(vec![1], 23, &PageParams::new(3), 10);
        assert_eq!(last.next, None);
    }

    #[test]
    fn empty_page_is_valid() {
        let page: Page<u8> = Page::empty(&PageParams::default(), 10);
        assert_eq!(page.count, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
        assert!(page.results.is_empty());
    }

    #[test]
    fn page_zero_is_first_page() {
        let params = PageParams::new(0);
        assert_eq!(params.number(), 1);
        assert_eq!(params.offset(10), 0);
        assert_eq!(PageParams::new(4).offset(10), 30);
    }

    #[test]
    fn huge_page_number_saturates() {
        assert_eq!(PageParams::new(u64::MAX).offset(10), i64::MAX);
        assert_eq!(PageParams::new(u64::MAX).offset(1), i64::MAX);

        let page: Page<u8> = Page::new(Vec::new(), 3, &PageParams::new(u64::MAX), 10);
        assert_eq!(page.count, 3);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(1));
    }
}
