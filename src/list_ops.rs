//! Stateless list transformations: filter, sort and page.
//!
//! These are the building blocks the scan list recomputes its view from.
//! None of them touch the window source.

use crate::window_source::WindowEntry;
use std::cmp::Ordering;

/// Title sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Keep entries whose title starts with `text` (trimmed, case-insensitive).
///
/// Input order is preserved. Blank text matches everything.
#[must_use]
pub fn filter_entries(entries: &[WindowEntry], text: &str) -> Vec<WindowEntry> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return entries.to_vec();
    }

    entries
        .iter()
        .filter(|e| e.title.to_lowercase().starts_with(&needle))
        .cloned()
        .collect()
}

/// Case-insensitive title comparison without allocating.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Sort entries by title in place. Stable in both directions.
pub fn sort_entries(entries: &mut [WindowEntry], order: SortOrder) {
    match order {
        SortOrder::Ascending => entries.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOrder::Descending => entries.sort_by(|a, b| compare_titles(&b.title, &a.title)),
    }
}

/// Entries on page `page_index`, clipped to the end of the list.
///
/// Returns an empty slice for a zero page size or an out-of-range page.
#[must_use]
pub fn page_slice(entries: &[WindowEntry], page_index: usize, page_size: usize) -> &[WindowEntry] {
    if page_size == 0 {
        return &[];
    }

    let Some(start) = page_index.checked_mul(page_size) else {
        return &[];
    };
    if start >= entries.len() {
        return &[];
    }

    let end = start.saturating_add(page_size).min(entries.len());
    &entries[start..end]
}

/// Number of pages needed for `len` entries. Zero while the page size is unknown.
#[must_use]
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window_source::WindowHandle;

    fn make_entries(titles: &[&str]) -> Vec<WindowEntry> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| WindowEntry::new(WindowHandle(i as i64), *t))
            .collect()
    }

    fn titles(entries: &[WindowEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    // ==================== filter_entries tests ====================

    #[test]
    fn test_filter_blank_matches_everything() {
        let entries = make_entries(&["Zeta", "alpha", "Beta"]);
        assert_eq!(filter_entries(&entries, ""), entries);
        assert_eq!(filter_entries(&entries, "   "), entries);
    }

    #[test]
    fn test_filter_prefix_case_insensitive_keeps_order() {
        let entries = make_entries(&["Terminal", "notes", "tetris", "Top", "Mutt"]);
        let result = filter_entries(&entries, "  TE ");
        assert_eq!(titles(&result), vec!["Terminal", "tetris"]);
    }

    #[test]
    fn test_filter_is_prefix_not_substring() {
        let entries = make_entries(&["Calculator", "Notepad", "Paint"]);
        assert!(filter_entries(&entries, "a").is_empty());
        assert_eq!(titles(&filter_entries(&entries, "p")), vec!["Paint"]);
    }

    // ==================== sort_entries tests ====================

    #[test]
    fn test_sort_ascending_case_insensitive() {
        let mut entries = make_entries(&["Zeta", "alpha", "Beta"]);
        sort_entries(&mut entries, SortOrder::Ascending);
        assert_eq!(titles(&entries), vec!["alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn test_sort_descending_is_reverse_without_ties() {
        let mut asc = make_entries(&["mail", "Browser", "zsh", "Editor"]);
        let mut desc = asc.clone();
        sort_entries(&mut asc, SortOrder::Ascending);
        sort_entries(&mut desc, SortOrder::Descending);

        asc.reverse();
        assert_eq!(titles(&asc), titles(&desc));
    }

    #[test]
    fn test_sort_is_idempotent() {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let mut once = make_entries(&["b", "A", "c", "a", "B"]);
            sort_entries(&mut once, order);
            let mut twice = once.clone();
            sort_entries(&mut twice, order);

            let once_handles: Vec<_> = once.iter().map(|e| e.handle).collect();
            let twice_handles: Vec<_> = twice.iter().map(|e| e.handle).collect();
            assert_eq!(once_handles, twice_handles);
        }
    }

    #[test]
    fn test_sort_stable_for_equal_titles() {
        let mut entries = make_entries(&["Term", "Alpha", "term", "Term"]);
        sort_entries(&mut entries, SortOrder::Ascending);
        let handles: Vec<_> = entries.iter().map(|e| e.handle.0).collect();
        assert_eq!(handles, vec![1, 0, 2, 3]);

        let mut entries = make_entries(&["Term", "Alpha", "term", "Term"]);
        sort_entries(&mut entries, SortOrder::Descending);
        let handles: Vec<_> = entries.iter().map(|e| e.handle.0).collect();
        assert_eq!(handles, vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_sort_order_toggled() {
        assert_eq!(SortOrder::Ascending.toggled(), SortOrder::Descending);
        assert_eq!(SortOrder::Descending.toggled(), SortOrder::Ascending);
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
    }

    // ==================== page_slice tests ====================

    #[test]
    fn test_pages_reconstruct_list() {
        let entries = make_entries(&["a", "b", "c", "d", "e", "f", "g"]);
        for page_size in 1..=8 {
            let pages = page_count(entries.len(), page_size);
            let mut rebuilt = Vec::new();
            for page in 0..pages {
                let slice = page_slice(&entries, page, page_size);
                assert!(!slice.is_empty());
                assert!(slice.len() <= page_size);
                rebuilt.extend_from_slice(slice);
            }
            assert_eq!(rebuilt, entries, "page size {}", page_size);
        }
    }

    #[test]
    fn test_page_slice_out_of_range() {
        let entries = make_entries(&["a", "b", "c"]);
        assert!(page_slice(&entries, 2, 2).is_empty());
        assert!(page_slice(&entries, usize::MAX, 2).is_empty());
        assert!(page_slice(&entries, 0, 0).is_empty());
        assert!(page_slice(&[], 0, 4).is_empty());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 4), 0);
        assert_eq!(page_count(3, 2), 2);
        assert_eq!(page_count(4, 2), 2);
        assert_eq!(page_count(5, 0), 0);
    }

    #[test]
    fn test_scenario_sorted_pages() {
        let mut entries = filter_entries(&make_entries(&["Zeta", "alpha", "Beta"]), "");
        sort_entries(&mut entries, SortOrder::Ascending);

        assert_eq!(page_count(entries.len(), 2), 2);
        assert_eq!(titles(page_slice(&entries, 0, 2)), vec!["alpha", "Beta"]);
        assert_eq!(titles(page_slice(&entries, 1, 2)), vec!["Zeta"]);
    }
}
