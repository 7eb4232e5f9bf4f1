//! The scan list: authoritative view state behind the switcher panel.
//!
//! Holds the last fetched window snapshot, the filtered and sorted view over
//! it, and the current page. Every navigation command is a transition on this
//! state. The snapshot is only refreshed by [`ScanList::load`] and
//! [`ScanList::toggle_sort`]; filtering re-runs over the snapshot it already
//! has, so closed windows can linger until the next reload. Selection
//! re-checks liveness, see [`crate::selection`].

use anyhow::{Context, Result};
use tracing::debug;

use crate::list_ops::{filter_entries, page_count, page_slice, sort_entries, SortOrder};
use crate::window_source::{WindowEntry, WindowSource, SHOW_DESKTOP_TITLE};

pub struct ScanList<S: WindowSource> {
    source: S,
    process_filter: Option<String>,
    all_entries: Vec<WindowEntry>,
    // Leading entries that stay put when re-sorting (the desktop entry)
    pinned: usize,
    filtered: Vec<WindowEntry>,
    filter_text: String,
    sort_order: SortOrder,
    page_index: usize,
    // 0 until the renderer reports its row slots
    page_size: usize,
}

impl<S: WindowSource> ScanList<S> {
    /// Create an empty scan list. Nothing is fetched until [`ScanList::load`].
    ///
    /// A blank `process_filter` is the same as none.
    pub fn new(source: S, process_filter: Option<String>) -> Self {
        let process_filter = process_filter
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        ScanList {
            source,
            process_filter,
            all_entries: Vec::new(),
            pinned: 0,
            filtered: Vec::new(),
            filter_text: String::new(),
            sort_order: SortOrder::Ascending,
            page_index: 0,
            page_size: 0,
        }
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        page_count(self.filtered.len(), self.page_size)
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// The last fetched snapshot, sorted, with the desktop entry if any.
    pub fn all_entries(&self) -> &[WindowEntry] {
        &self.all_entries
    }

    /// The snapshot after the text filter.
    pub fn filtered_entries(&self) -> &[WindowEntry] {
        &self.filtered
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Whether the renderer has reported its row slots yet.
    pub fn is_ready(&self) -> bool {
        self.page_size > 0
    }

    /// Fix the page size. Only the first non-zero value is accepted.
    ///
    /// Returns true if the page size changed.
    pub fn set_page_size(&mut self, rows: usize) -> bool {
        if self.page_size != 0 || rows == 0 {
            return false;
        }
        debug!("Page size set to {}", rows);
        self.page_size = rows;
        true
    }

    /// Fetch a fresh snapshot, sort it, and re-apply the current filter text.
    ///
    /// On failure the previous snapshot and page are kept.
    pub fn load(&mut self) -> Result<()> {
        let (entries, pinned) = self.fetch()?;
        debug!(
            "Loaded {} windows ({:?}, process filter: {:?})",
            entries.len(),
            self.sort_order,
            self.process_filter
        );

        self.all_entries = entries;
        self.pinned = pinned;
        self.filtered = filter_entries(&self.all_entries, &self.filter_text);
        self.page_index = 0;
        Ok(())
    }

    /// Re-filter the last snapshot with `text`. Does not re-fetch.
    pub fn apply_filter(&mut self, text: &str) {
        self.filter_text = text.to_string();
        self.filtered = filter_entries(&self.all_entries, &self.filter_text);
        self.page_index = 0;
        debug!(
            "Filter {:?} matched {} of {} windows",
            self.filter_text,
            self.filtered.len(),
            self.all_entries.len()
        );
    }

    /// Flip the sort order and reload.
    ///
    /// If the reload fails, the previous snapshot is re-sorted in the new
    /// order so the view always matches the sort order.
    pub fn toggle_sort(&mut self) -> Result<()> {
        self.sort_order = self.sort_order.toggled();
        let loaded = self.load();
        if loaded.is_err()
            && let Some(rest) = self.all_entries.get_mut(self.pinned..)
        {
            sort_entries(rest, self.sort_order);
        }
        self.filtered = filter_entries(&self.all_entries, &self.filter_text);
        self.page_index = 0;
        loaded
    }

    /// Advance one page. Returns false when already on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page_index + 1 >= self.page_count() {
            return false;
        }

        let next_start = (self.page_index + 1) * self.page_size;
        if next_start >= self.filtered.len() {
            return false;
        }

        self.page_index += 1;
        debug!("Moved to page {} of {}", self.page_index + 1, self.page_count());
        true
    }

    /// Go back one page. Returns false when already on the first page.
    pub fn previous_page(&mut self) -> bool {
        if self.page_index == 0 {
            return false;
        }

        self.page_index = self.page_index.saturating_sub(1);
        debug!("Moved to page {} of {}", self.page_index + 1, self.page_count());
        true
    }

    /// Entries visible on the current page.
    pub fn current_page_entries(&self) -> &[WindowEntry] {
        page_slice(&self.filtered, self.page_index, self.page_size)
    }

    /// Entry bound to row `slot` of the current page.
    pub fn entry_at_slot(&self, slot: usize) -> Option<&WindowEntry> {
        self.current_page_entries().get(slot)
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        let pages = self.page_count();
        pages > 0 && self.page_index + 1 < pages
    }

    /// Fresh sorted entries and how many of them lead unsorted.
    fn fetch(&mut self) -> Result<(Vec<WindowEntry>, usize)> {
        let windows = self
            .source
            .enumerate()
            .context("Failed to enumerate windows")?;

        let mut entries = match self.process_filter.as_deref() {
            Some(process) => {
                let process = process.to_lowercase();
                let mut kept = Vec::with_capacity(windows.len());
                for window in windows {
                    match self.source.owner_process_name(window.handle) {
                        Ok(Some(name)) if name.to_lowercase() == process => kept.push(window),
                        Ok(_) => {}
                        Err(e) => debug!("Could not resolve owner of window {}: {}", window.handle, e),
                    }
                }
                kept
            }
            None => windows,
        };

        sort_entries(&mut entries, self.sort_order);

        let mut pinned = 0;
        if self.process_filter.is_none()
            && let Some(desktop) = self.source.desktop_handle()
        {
            entries.insert(0, WindowEntry::new(desktop, SHOW_DESKTOP_TITLE));
            pinned = 1;
        }

        Ok((entries, pinned))
    }
}
