//! Page math for catalog search results.

use serde::Serialize;

use crate::models::{PageState, PAGE_SIZE};

/// Number of pages needed to show `total_results` hits
pub fn total_pages_for(total_results: u32) -> u32 {
    total_results.div_ceil(PAGE_SIZE)
}

/// What the prev/next controls should look like for a given state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControls {
    /// Controls are hidden entirely when there is nothing to page through
    pub visible: bool,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub label: String,
}

impl PageState {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Advance one page. Returns false (and changes nothing) on the last page.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Go back one page. Returns false (and changes nothing) on the first page.
    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.current_page -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Record a new page count, keeping the current page inside it
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
        if total_pages > 0 && self.current_page > total_pages {
            self.current_page = total_pages;
        }
    }

    pub fn clear(&mut self) {
        *self = PageState::default();
    }

    pub fn controls(&self, is_loading: bool) -> PaginationControls {
        PaginationControls {
            visible: self.total_pages > 0,
            prev_enabled: self.has_prev() && !is_loading,
            next_enabled: self.has_next() && !is_loading,
            label: format!("Page {} of {}", self.current_page, self.total_pages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(current_page: u32, total_pages: u32) -> PageState {
        PageState {
            current_page,
            total_pages,
        }
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages_for(0), 0);
        assert_eq!(total_pages_for(1), 1);
        assert_eq!(total_pages_for(10), 1);
        assert_eq!(total_pages_for(11), 2);
        assert_eq!(total_pages_for(23), 3);
        assert_eq!(total_pages_for(u32::MAX), 429_496_730);
    }

    #[test]
    fn test_next_stops_at_last_page() {
        let mut state = page(1, 3);
        let mut seen = vec![state.current_page];
        for _ in 0..3 {
            state.next();
            seen.push(state.current_page);
        }
        assert_eq!(seen, vec![1, 2, 3, 3]);
        assert!(!state.next());
    }

    #[test]
    fn test_prev_stops_at_first_page() {
        let mut state = page(2, 3);
        assert!(state.prev());
        assert_eq!(state.current_page, 1);
        assert!(!state.prev());
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn test_next_noop_without_pages() {
        let mut state = PageState::default();
        assert!(!state.next());
        assert_eq!(state, PageState::default());
    }

    #[test]
    fn test_set_total_pages_clamps_current_page() {
        let mut state = page(5, 5);
        state.set_total_pages(2);
        assert_eq!(state, page(2, 2));

        state.set_total_pages(0);
        assert_eq!(state, page(2, 0));
    }

    #[test]
    fn test_controls_hidden_without_pages() {
        let controls = PageState::default().controls(false);
        assert!(!controls.visible);
        assert!(!controls.prev_enabled);
        assert!(!controls.next_enabled);
    }

    #[test]
    fn test_controls_at_boundaries() {
        let first = page(1, 3).controls(false);
        assert!(first.visible);
        assert!(!first.prev_enabled);
        assert!(first.next_enabled);
        assert_eq!(first.label, "Page 1 of 3");

        let last = page(3, 3).controls(false);
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);
    }

    #[test]
    fn test_controls_disabled_while_loading() {
        let controls = page(2, 3).controls(true);
        assert!(controls.visible);
        assert!(!controls.prev_enabled);
        assert!(!controls.next_enabled);
    }
}
