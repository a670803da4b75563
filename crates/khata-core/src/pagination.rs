//! # Pagination Engine
//!
//! A small state machine that turns a filtered collection into pages for the
//! view layer.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  State: { current_page, items_per_page, filtered }                      │
//! │                                                                         │
//! │  set_data(records) ─────┐                                               │
//! │  apply_filter(records) ─┼──► recount, current_page = 1                  │
//! │  apply_query(query) ────┤                                               │
//! │  set_page_size(n) ──────┘                                               │
//! │                                                                         │
//! │  go_to_page(n) ──► n in 1..=total_pages ? current_page = n : no-op      │
//! │  next()/previous() ──► go_to_page(current_page ± 1)                     │
//! │                                                                         │
//! │  current_page_slice() ──► filtered[(p-1)*size .. p*size]                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `total_pages == ceil(total_items / items_per_page)` (0 when empty)
//! - `1 <= current_page <= max(total_pages, 1)`
//! - `items_per_page >= 1`
//!
//! Changing the page size mid-browse returns to page 1 rather than trying to
//! keep the same record on screen.
//!
//! ## Example
//! ```rust
//! use khata_core::pagination::Paginator;
//!
//! let mut pages = Paginator::new(10);
//! pages.set_data((1..=23).collect::<Vec<u32>>());
//!
//! assert_eq!(pages.total_pages(), 3);
//! assert!(pages.go_to_page(3));
//! assert_eq!(pages.current_page_slice(), &[21, 22, 23]);
//! assert!(!pages.go_to_page(4)); // stays on page 3
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::query::Query;

/// Page size used when a module does not choose one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// =============================================================================
// Paginator
// =============================================================================

/// Pagination state for one collection view.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    /// Full dataset from the last `set_data`.
    data: Vec<T>,
    /// What is being paged: the data itself or the last filter result.
    filtered: Vec<T>,
    current_page: usize,
    items_per_page: usize,
}

impl<T> Paginator<T> {
    /// Creates an empty paginator. A zero page size is raised to 1.
    pub fn new(items_per_page: usize) -> Self {
        Paginator {
            data: Vec::new(),
            filtered: Vec::new(),
            current_page: 1,
            items_per_page: items_per_page.max(1),
        }
    }

    /// Replaces the base dataset and pages over all of it from page 1.
    pub fn set_data(&mut self, records: Vec<T>)
    where
        T: Clone,
    {
        self.filtered = records.clone();
        self.data = records;
        self.current_page = 1;
    }

    /// Pages over an already filtered and sorted result, from page 1.
    ///
    /// The base dataset is left untouched so a later query can start from it
    /// again.
    pub fn apply_filter(&mut self, filtered: Vec<T>) {
        self.filtered = filtered;
        self.current_page = 1;
    }

    /// Runs `query` over the base dataset and pages over the result.
    pub fn apply_query(&mut self, query: &Query<'_, T>)
    where
        T: Clone,
    {
        let filtered = query.apply(&self.data);
        self.apply_filter(filtered);
    }

    /// Drops any filter and pages over the whole base dataset again.
    pub fn clear_filter(&mut self)
    where
        T: Clone,
    {
        let all = self.data.clone();
        self.apply_filter(all);
    }

    /// The records on the current page.
    pub fn current_page_slice(&self) -> &[T] {
        let start = (self.current_page - 1) * self.items_per_page;
        if start >= self.filtered.len() {
            return &[];
        }
        let end = (start + self.items_per_page).min(self.filtered.len());
        &self.filtered[start..end]
    }

    /// Moves to page `page`. Returns false (and changes nothing) when the
    /// page does not exist.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Moves forward one page; no-op on the last page.
    pub fn next(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    /// Moves back one page; no-op on the first page.
    pub fn previous(&mut self) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    /// Changes the page size and returns to page 1.
    ///
    /// A size of zero is rejected and leaves the state unchanged.
    pub fn set_page_size(&mut self, size: usize) -> bool {
        if size == 0 {
            return false;
        }
        self.items_per_page = size;
        self.current_page = 1;
        true
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    /// Number of records being paged (after filtering).
    pub fn total_items(&self) -> usize {
        self.filtered.len()
    }

    /// `ceil(total_items / items_per_page)`; 0 for an empty result.
    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(self.items_per_page)
    }

    /// The full filtered result in page order.
    pub fn filtered_data(&self) -> &[T] {
        &self.filtered
    }

    /// The base dataset from the last `set_data`.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Snapshot of the counters, without records.
    pub fn info(&self) -> PageInfo {
        let total_items = self.total_items();
        let shown = self.current_page_slice().len();
        let first_item = if shown == 0 {
            0
        } else {
            (self.current_page - 1) * self.items_per_page + 1
        };

        PageInfo {
            current_page: self.current_page,
            total_pages: self.total_pages(),
            total_items,
            items_per_page: self.items_per_page,
            first_item,
            last_item: if shown == 0 { 0 } else { first_item + shown - 1 },
            has_previous: self.has_previous(),
            has_next: self.has_next(),
        }
    }

    /// Everything the view layer needs to render rows and controls.
    pub fn view(&self) -> PageView<'_, T> {
        PageView {
            items: self.current_page_slice(),
            info: self.info(),
        }
    }

    /// Page-number strip for pagination controls.
    ///
    /// At most `max_links` page numbers are shown (first and last always
    /// included, minimum 5), with [`PageLink::Ellipsis`] marking gaps.
    ///
    /// ```rust
    /// use khata_core::pagination::{PageLink, Paginator};
    ///
    /// let mut p = Paginator::new(1);
    /// p.set_data((1..=20).collect::<Vec<u32>>());
    /// p.go_to_page(10);
    ///
    /// use PageLink::{Ellipsis, Page};
    /// assert_eq!(
    ///     p.page_links(7),
    ///     vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(20)]
    /// );
    /// ```
    pub fn page_links(&self, max_links: usize) -> Vec<PageLink> {
        page_links(self.current_page, self.total_pages(), max_links)
    }
}

impl<T> Default for Paginator<T> {
    fn default() -> Self {
        Paginator::new(DEFAULT_PAGE_SIZE)
    }
}

// =============================================================================
// View Types
// =============================================================================

/// Counters for rendering "Showing 11–20 of 23" and prev/next buttons.
///
/// `first_item`/`last_item` are 1-based and both 0 when nothing is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub first_item: usize,
    pub last_item: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// The current page's records plus its counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<'a, T> {
    pub items: &'a [T],
    #[serde(flatten)]
    pub info: PageInfo,
}

/// One entry in the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "page", rename_all = "snake_case")]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

fn page_links(current: usize, total: usize, max_links: usize) -> Vec<PageLink> {
    let max_links = max_links.max(5);
    if total <= max_links {
        return (1..=total).map(PageLink::Page).collect();
    }

    // Three layouts, each exactly `max_links` long:
    //   near start: 1 2 3 4 5 … N
    //   middle:     1 … w w w … N
    //   near end:   1 … N-4 .. N
    let window = max_links - 4;
    let start = current.saturating_sub((window - 1) / 2);
    let end = start + window - 1;

    let mut links = Vec::with_capacity(max_links);
    if start <= 3 {
        links.extend((1..=max_links - 2).map(PageLink::Page));
        links.push(PageLink::Ellipsis);
        links.push(PageLink::Page(total));
    } else if end + 2 >= total {
        links.push(PageLink::Page(1));
        links.push(PageLink::Ellipsis);
        links.extend((total + 3 - max_links..=total).map(PageLink::Page));
    } else {
        links.push(PageLink::Page(1));
        links.push(PageLink::Ellipsis);
        links.extend((start..=end).map(PageLink::Page));
        links.push(PageLink::Ellipsis);
        links.push(PageLink::Page(total));
    }
    links
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use PageLink::{Ellipsis, Page};

    fn paginator(n: u32, size: usize) -> Paginator<u32> {
        let mut p = Paginator::new(size);
        p.set_data((1..=n).collect());
        p
    }

    #[test]
    fn test_twenty_three_items_in_pages_of_ten() {
        let mut p = paginator(23, 10);
        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.current_page_slice().len(), 10);

        assert!(p.next());
        assert_eq!(p.current_page_slice().len(), 10);
        assert!(p.next());
        assert_eq!(p.current_page_slice(), &[21, 22, 23]);

        assert!(!p.go_to_page(4));
        assert_eq!(p.current_page(), 3);
        assert!(!p.next());
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn test_previous_clamps_at_first_page() {
        let mut p = paginator(5, 2);
        assert!(!p.previous());
        assert_eq!(p.current_page(), 1);
        assert!(!p.go_to_page(0));
    }

    #[test]
    fn test_empty_dataset() {
        let mut p: Paginator<u32> = Paginator::new(10);
        p.set_data(Vec::new());
        assert_eq!(p.total_pages(), 0);
        assert_eq!(p.total_items(), 0);
        assert!(p.current_page_slice().is_empty());
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.items_per_page(), 10);
        assert!(!p.go_to_page(1));

        let info = p.info();
        assert_eq!((info.first_item, info.last_item), (0, 0));
        assert!(!info.has_next && !info.has_previous);
        assert!(p.page_links(7).is_empty());
    }

    #[test]
    fn test_apply_filter_resets_page() {
        let mut p = paginator(50, 10);
        p.go_to_page(4);
        p.apply_filter((1..=30).collect());
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 3);
        // base data is untouched
        assert_eq!(p.data().len(), 50);
    }

    #[test]
    fn test_apply_query_filters_base_data() {
        let mut p = paginator(30, 5);
        p.go_to_page(3);
        let evens = Query::new().filter(|n: &u32| n % 2 == 0);
        p.apply_query(&evens);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_items(), 15);
        assert_eq!(p.current_page_slice(), &[2, 4, 6, 8, 10]);

        // A second query starts from the base data, not the previous result
        let small = Query::new().filter(|n: &u32| *n <= 3);
        p.apply_query(&small);
        assert_eq!(p.filtered_data(), &[1, 2, 3]);

        p.clear_filter();
        assert_eq!(p.total_items(), 30);
    }

    #[test]
    fn test_set_page_size_resets_page() {
        let mut p = paginator(23, 10);
        p.go_to_page(2);
        assert!(p.set_page_size(5));
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 5);

        assert!(!p.set_page_size(0));
        assert_eq!(p.items_per_page(), 5);
    }

    #[test]
    fn test_zero_page_size_constructor_is_clamped() {
        let p: Paginator<u32> = Paginator::new(0);
        assert_eq!(p.items_per_page(), 1);
    }

    #[test]
    fn test_info_ranges() {
        let mut p = paginator(23, 10);
        p.go_to_page(3);
        let info = p.info();
        assert_eq!(info.first_item, 21);
        assert_eq!(info.last_item, 23);
        assert!(info.has_previous);
        assert!(!info.has_next);

        let view = p.view();
        assert_eq!(view.items, &[21, 22, 23]);
        assert_eq!(view.info, info);
    }

    #[test]
    fn test_view_serializes_flat() {
        let p = paginator(3, 2);
        let json = serde_json::to_value(p.view()).unwrap();
        assert_eq!(json["items"], serde_json::json!([1, 2]));
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["currentPage"], 1);
    }

    #[test]
    fn test_page_links() {
        assert_eq!(page_links(1, 3, 7), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(
            page_links(1, 20, 7),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(20)]
        );
        assert_eq!(
            page_links(20, 20, 7),
            vec![Page(1), Ellipsis, Page(16), Page(17), Page(18), Page(19), Page(20)]
        );
        assert_eq!(
            page_links(10, 20, 7),
            vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(20)]
        );
    }

    proptest! {
        #[test]
        fn prop_pages_reassemble_filtered_data(n in 0u32..200, size in 1usize..25) {
            let mut p = paginator(n, size);
            prop_assert_eq!(p.total_pages(), (n as usize).div_ceil(size));

            let mut collected = Vec::new();
            for page in 1..=p.total_pages() {
                prop_assert!(p.go_to_page(page));
                let slice = p.current_page_slice();
                prop_assert!(slice.len() <= size);
                collected.extend_from_slice(slice);
            }
            prop_assert_eq!(collected.as_slice(), p.filtered_data());
        }

        #[test]
        fn prop_current_page_stays_in_bounds(n in 0u32..100, size in 1usize..10, moves in prop::collection::vec(0usize..20, 0..30)) {
            let mut p = paginator(n, size);
            for m in moves {
                match m % 3 {
                    0 => { p.next(); }
                    1 => { p.previous(); }
                    _ => { p.go_to_page(m); }
                }
                prop_assert!(p.current_page() >= 1);
                prop_assert!(p.current_page() <= p.total_pages().max(1));
            }
        }

        #[test]
        fn prop_page_links_bounded(total in 1usize..200, current_seed in 0usize..200, max in 5usize..12) {
            let current = current_seed % total + 1;
            let links = page_links(current, total, max);
            let pages: Vec<usize> = links.iter().filter_map(|l| match l {
                Page(n) => Some(*n),
                Ellipsis => None,
            }).collect();
            prop_assert!(links.len() <= max);
            prop_assert_eq!(pages.first().copied(), Some(1));
            prop_assert_eq!(pages.last().copied(), Some(total));
            prop_assert!(pages.contains(&current));
            prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
