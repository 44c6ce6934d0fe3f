use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Clamps to `page >= 1` and `1 <= limit <= MAX_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self, request: PageRequest) -> u64 {
        self.total.div_ceil(u64::from(request.limit))
    }

    /// Slices an already-sorted full result set.
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit as usize)
            .collect();
        Self { items, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_clamped() {
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(None, Some(1000)).limit, MAX_LIMIT);
        assert_eq!(PageRequest::default(), PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn slices_and_counts_pages() {
        let req = PageRequest::new(Some(2), Some(3));
        let page = Page::from_sorted((1..=7).collect::<Vec<_>>(), req);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages(req), 3);

        let past_end = Page::from_sorted(vec![1, 2], PageRequest::new(Some(5), Some(3)));
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 2);
    }
}
