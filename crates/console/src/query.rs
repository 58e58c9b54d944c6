use std::collections::BTreeMap;

/// Sort direction, serialized as `asc`/`desc` in query strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Canonical description of one list query.
///
/// Invariant: mutating anything except `page` snaps `page` back to 1, so a
/// narrower result set can never silently display an out-of-range page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub search: String,
    pub filters: BTreeMap<String, String>,
    pub page: u32,
    pub page_size: u32,
    pub sort_field: String,
    pub sort_order: SortOrder,
}

impl QueryDescriptor {
    pub fn new(sort_field: &str, sort_order: SortOrder, page_size: u32) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            page: 1,
            page_size: page_size.max(1),
            sort_field: sort_field.to_string(),
            sort_order,
        }
    }

    /// Query-string pairs in the shape the backend expects.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 5);
        if !self.search.is_empty() {
            pairs.push(("search".to_string(), self.search.clone()));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("limit".to_string(), self.page_size.to_string()));
        pairs.push(("sortBy".to_string(), self.sort_field.clone()));
        pairs.push(("sortOrder".to_string(), self.sort_order.as_str().to_string()));
        pairs
    }
}

/// Holds the live descriptor plus the defaults `reset` returns to.
#[derive(Clone, Debug)]
pub struct QueryState {
    defaults: QueryDescriptor,
    current: QueryDescriptor,
}

impl QueryState {
    pub fn new(defaults: QueryDescriptor) -> Self {
        Self {
            current: defaults.clone(),
            defaults,
        }
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.current
    }

    pub fn set_search(&mut self, search: &str) {
        self.current.search = search.trim().to_string();
        self.current.page = 1;
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        self.current
            .filters
            .insert(key.to_string(), value.to_string());
        self.current.page = 1;
    }

    pub fn clear_filter(&mut self, key: &str) {
        self.current.filters.remove(key);
        self.current.page = 1;
    }

    pub fn set_sort(&mut self, field: &str, order: SortOrder) {
        self.current.sort_field = field.to_string();
        self.current.sort_order = order;
        self.current.page = 1;
    }

    /// The one mutator that leaves everything else untouched.
    pub fn set_page(&mut self, page: u32) {
        self.current.page = page.max(1);
    }

    /// Changing density resets the page too: page 7 of 20-per-page points at
    /// different rows than page 7 of 100-per-page.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.current.page_size = page_size.max(1);
        self.current.page = 1;
    }

    pub fn reset(&mut self) {
        self.current = self.defaults.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> QueryState {
        QueryState::new(QueryDescriptor::new("createdAt", SortOrder::Desc, 20))
    }

    #[test]
    fn every_mutator_but_set_page_resets_page() {
        let mut query = state();
        query.set_page(7);
        assert_eq!(query.descriptor().page, 7);

        query.set_search("ada");
        assert_eq!(query.descriptor().page, 1);

        query.set_page(7);
        query.set_filter("status", "active");
        assert_eq!(query.descriptor().page, 1);

        query.set_page(7);
        query.clear_filter("status");
        assert_eq!(query.descriptor().page, 1);

        query.set_page(7);
        query.set_sort("username", SortOrder::Asc);
        assert_eq!(query.descriptor().page, 1);

        query.set_page(7);
        query.set_page_size(50);
        assert_eq!(query.descriptor().page, 1);
    }

    #[test]
    fn set_page_touches_nothing_else() {
        let mut query = state();
        query.set_filter("status", "active");
        let before = query.descriptor().clone();

        query.set_page(3);
        let after = query.descriptor();
        assert_eq!(after.page, 3);
        assert_eq!(after.filters, before.filters);
        assert_eq!(after.search, before.search);
        assert_eq!(after.page_size, before.page_size);
    }

    #[test]
    fn page_is_clamped_to_one() {
        let mut query = state();
        query.set_page(0);
        assert_eq!(query.descriptor().page, 1);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut query = state();
        query.set_search("x");
        query.set_filter("status", "suspended");
        query.set_page(4);
        query.reset();
        assert_eq!(query.descriptor(), state().descriptor());
    }

    #[test]
    fn query_pairs_follow_backend_contract() {
        let mut query = state();
        query.set_search("ada");
        query.set_filter("status", "active");
        query.set_page(2);

        let pairs = query.descriptor().to_query_pairs();
        assert!(pairs.contains(&("search".to_string(), "ada".to_string())));
        assert!(pairs.contains(&("status".to_string(), "active".to_string())));
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "20".to_string())));
        assert!(pairs.contains(&("sortBy".to_string(), "createdAt".to_string())));
        assert!(pairs.contains(&("sortOrder".to_string(), "desc".to_string())));
    }
}
