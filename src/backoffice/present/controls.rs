use crate::engine::PageSlice;
use serde::Serialize;
use std::collections::BTreeSet;

/// Pages shown on each side of the current one.
const WINDOW: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLink {
    Page { number: usize, current: bool },
    Gap,
}

/// Pagination controls for one page: prev/next, "Showing X–Y of Z", page links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
    /// 1-based ordinal of the first row shown; 0 when nothing is shown.
    pub first_item: usize,
    pub last_item: usize,
    pub links: Vec<PageLink>,
}

impl PageControls {
    pub fn from_slice<T>(slice: &PageSlice<T>) -> Self {
        let shown = slice.items.len();
        let (first_item, last_item) = if shown == 0 {
            (0, 0)
        } else {
            let start = slice.start_index();
            (start + 1, start + shown)
        };

        Self {
            page: slice.page,
            total_pages: slice.total_pages,
            total_count: slice.total_count,
            has_prev: slice.page > 1 && slice.total_pages > 0,
            has_next: slice.page < slice.total_pages,
            first_item,
            last_item,
            links: page_links(slice.page, slice.total_pages),
        }
    }

    pub fn summary(&self) -> String {
        if self.total_count == 0 {
            "No results".to_string()
        } else {
            format!(
                "Showing {}–{} of {}",
                self.first_item, self.last_item, self.total_count
            )
        }
    }
}

/// `1 … 4 5 6 … 12`: first, last and a window around `current`.
///
/// A gap never stands in for a single page; that page is shown instead.
pub fn page_links(current: usize, total_pages: usize) -> Vec<PageLink> {
    if total_pages == 0 {
        return Vec::new();
    }

    let mut pages = BTreeSet::new();
    pages.insert(1);
    pages.insert(total_pages);
    let lo = current.saturating_sub(WINDOW).max(1);
    let hi = (current + WINDOW).min(total_pages);
    for page in lo..=hi {
        pages.insert(page);
    }

    let mut links = Vec::new();
    let mut previous: Option<usize> = None;
    for page in pages {
        if let Some(prev) = previous {
            match page - prev {
                1 => {}
                2 => links.push(PageLink::Page {
                    number: prev + 1,
                    current: prev + 1 == current,
                }),
                _ => links.push(PageLink::Gap),
            }
        }
        links.push(PageLink::Page {
            number: page,
            current: page == current,
        });
        previous = Some(page);
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{paginate, PaginationState};

    fn render(links: &[PageLink]) -> String {
        links
            .iter()
            .map(|l| match l {
                PageLink::Page { number, current: true } => format!("[{}]", number),
                PageLink::Page { number, .. } => number.to_string(),
                PageLink::Gap => "…".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn windowed_links() {
        assert_eq!(render(&page_links(5, 12)), "1 … 4 [5] 6 … 12");
        assert_eq!(render(&page_links(1, 12)), "[1] 2 … 12");
        assert_eq!(render(&page_links(12, 12)), "1 … 11 [12]");
        assert_eq!(render(&page_links(3, 12)), "1 2 [3] 4 … 12");
        assert_eq!(render(&page_links(1, 1)), "[1]");
        assert!(page_links(1, 0).is_empty());
    }

    #[test]
    fn summary_and_flags() {
        let items: Vec<u32> = (0..45).collect();
        let slice = paginate(&items, PaginationState { page: 2, page_size: 10 });
        let controls = PageControls::from_slice(&slice);
        assert!(controls.has_prev);
        assert!(controls.has_next);
        assert_eq!(controls.summary(), "Showing 11–20 of 45");

        let last = PageControls::from_slice(&paginate(&items, PaginationState { page: 5, page_size: 10 }));
        assert!(!last.has_next);
        assert_eq!(last.summary(), "Showing 41–45 of 45");
    }

    #[test]
    fn empty_collection() {
        let items: Vec<u32> = Vec::new();
        let controls = PageControls::from_slice(&paginate(&items, PaginationState::new(10)));
        assert!(!controls.has_prev);
        assert!(!controls.has_next);
        assert_eq!(controls.summary(), "No results");
    }
}
