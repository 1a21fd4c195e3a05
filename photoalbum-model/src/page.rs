pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }

    /// Parses a raw `?page=` value. Anything that is not a positive integer
    /// falls back to the first page.
    pub fn from_query(raw: Option<&str>, limit: u32) -> Self {
        let page = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|page| *page >= 1)
            .map(|page| u32::try_from(page).unwrap_or(u32::MAX))
            .unwrap_or(1);
        Self::new(page, limit)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, count: u64) -> u64 {
        count.div_ceil(u64::from(self.limit))
    }
}

/// One page of a listing plus the totals the client needs for infinite
/// scroll bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Page<T> {
    pub images: Vec<T>,
    pub page: u32,
    pub total_pages: u64,
    pub count: u64,
}

impl<T> Page<T> {
    pub fn new(images: Vec<T>, request: PageRequest, count: u64) -> Self {
        Self {
            images,
            page: request.page,
            total_pages: request.total_pages(count),
            count,
        }
    }

    pub fn has_more(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_query_parsing() {
        assert_eq!(PageRequest::from_query(None, 10).page, 1);
        assert_eq!(PageRequest::from_query(Some("abc"), 10).page, 1);
        assert_eq!(PageRequest::from_query(Some("0"), 10).page, 1);
        assert_eq!(PageRequest::from_query(Some("-4"), 10).page, 1);
        assert_eq!(PageRequest::from_query(Some(" 3 "), 10).page, 3);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::first(10);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
    }

    #[test]
    fn page_reports_remaining_pages() {
        let page: Page<()> = Page::new(vec![], PageRequest::new(1, 10), 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_more());

        let last: Page<()> = Page::new(vec![], PageRequest::new(3, 10), 25);
        assert!(!last.has_more());
    }
}
