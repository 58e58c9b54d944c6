use std::collections::BTreeSet;

/// IDs selected on the current page.
///
/// Selection is page-scoped and query-scoped: the owning panel reconciles it
/// against every new page and clears it outright on any query change.
#[derive(Clone, Debug, Default)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Toggling select-all: selecting when everything is already selected
    /// clears instead, so two presses restore the empty set.
    pub fn select_all<'a, I>(&mut self, page_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let all: BTreeSet<String> = page_ids.into_iter().map(str::to_string).collect();
        if self.ids == all {
            self.ids.clear();
        } else {
            self.ids = all;
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Drops every selected ID no longer present on the page, keeping the
    /// `selection ⊆ page` invariant after a refresh.
    pub fn retain_present<'a, I>(&mut self, page_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: BTreeSet<&str> = page_ids.into_iter().collect();
        self.ids.retain(|id| present.contains(id.as_str()));
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_membership() {
        let mut selection = SelectionSet::default();
        selection.toggle("u1");
        assert!(selection.is_selected("u1"));
        selection.toggle("u1");
        assert!(!selection.is_selected("u1"));
    }

    #[test]
    fn select_all_twice_restores_empty_set() {
        let mut selection = SelectionSet::default();
        let page = ["u1", "u2", "u3"];

        selection.select_all(page);
        assert_eq!(selection.len(), 3);

        selection.select_all(page);
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_over_partial_selection_selects_everything() {
        let mut selection = SelectionSet::default();
        selection.toggle("u2");

        selection.select_all(["u1", "u2", "u3"]);
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn retain_present_drops_vanished_ids() {
        let mut selection = SelectionSet::default();
        selection.toggle("u1");
        selection.toggle("u2");

        selection.retain_present(["u2", "u9"]);
        assert_eq!(selection.ids(), vec!["u2".to_string()]);
    }
}
