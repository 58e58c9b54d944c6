use api_types::common::ListEnvelope;

/// One page of list results, replaced wholesale on every fetch.
#[derive(Clone, Debug)]
pub struct ResourcePage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> ResourcePage<T> {
    /// Fallback page shown when a fetch fails: stale rows are dropped rather
    /// than displayed as current.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 0,
            total_count: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

impl<T> From<ListEnvelope<T>> for ResourcePage<T> {
    fn from(envelope: ListEnvelope<T>) -> Self {
        let pagination = envelope.pagination;
        Self {
            items: envelope.items,
            page: pagination.page,
            total_pages: pagination.total_pages,
            total_count: pagination.total_count,
            has_next: pagination.page < pagination.total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::common::Pagination;

    fn envelope(page: u32, total_pages: u32) -> ListEnvelope<&'static str> {
        ListEnvelope {
            items: vec!["row"],
            pagination: Pagination {
                page,
                total_pages,
                total_count: 42,
            },
        }
    }

    #[test]
    fn has_next_iff_pages_remain() {
        assert!(ResourcePage::from(envelope(1, 3)).has_next);
        assert!(!ResourcePage::from(envelope(3, 3)).has_next);
    }

    #[test]
    fn has_prev_iff_past_first_page() {
        assert!(!ResourcePage::from(envelope(1, 3)).has_prev);
        assert!(ResourcePage::from(envelope(2, 3)).has_prev);
    }
}
