//! View state and its reducer.
//!
//! Search, filters, sort, page and selection depend on each other (a new
//! filter moves the page, a page change may clear the selection). They live in
//! one [`ViewState`] and only change through [`ViewState::reduce`], which
//! applies one [`Action`] and returns the next state with every invariant
//! restored:
//!
//! - the page is always within `[1, max(1, total_pages)]`
//! - search, filter and sort changes go back to page 1
//! - with [`SelectionScope::Page`], any change of the visible rows clears the selection
//! - selections never reference records that no longer exist after `RecordsChanged`

use super::query::{compute_visible, paginate, PageSlice, PaginationState, QueryState, SortSpec};
use super::selection::Selection;
use crate::fields::FilterOp;
use crate::model::Resource;
use crate::schema::{ResourceConfig, SelectionScope};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<Id> {
    SetSearch(String),
    /// Raw filter-control input for a field; blank input removes the filter.
    SetFilter { key: String, raw: String },
    ClearFilter(String),
    ClearFilters,
    SortHeaderClick(String),
    GoToPage(usize),
    NextPage,
    PrevPage,
    SetPageSize(usize),
    ToggleSelect(Id),
    SelectAllVisible,
    ClearSelection,
    /// The record collection changed underneath the view.
    RecordsChanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<Id: Ord> {
    pub query: QueryState,
    pub pagination: PaginationState,
    pub selection: Selection<Id>,
}

impl<Id: Ord + Clone + std::fmt::Debug> ViewState<Id> {
    pub fn new(config: &ResourceConfig) -> Self {
        Self {
            query: QueryState::default(),
            pagination: PaginationState::new(config.page_size),
            selection: Selection::new(),
        }
    }

    /// The filtered, sorted collection.
    pub fn visible<'a, R>(&self, records: &'a [R], config: &ResourceConfig) -> Vec<&'a R>
    where
        R: Resource<Id = Id>,
    {
        compute_visible(records, &self.query, config)
    }

    /// The current page of the filtered, sorted collection.
    ///
    /// Without pagination the whole collection is one page.
    pub fn page<'a, R>(&self, records: &'a [R], config: &ResourceConfig) -> PageSlice<&'a R>
    where
        R: Resource<Id = Id>,
    {
        let visible = self.visible(records, config);
        if config.features.pagination {
            paginate(&visible, self.pagination)
        } else {
            let size = visible.len().max(1);
            paginate(&visible, PaginationState { page: 1, page_size: size })
        }
    }

    pub fn visible_ids<R>(&self, records: &[R], config: &ResourceConfig) -> Vec<Id>
    where
        R: Resource<Id = Id>,
    {
        self.page(records, config)
            .items
            .iter()
            .map(|r| r.id())
            .collect()
    }

    /// Applies one action and returns the next state.
    pub fn reduce<R>(mut self, action: Action<Id>, records: &[R], config: &ResourceConfig) -> Self
    where
        R: Resource<Id = Id>,
    {
        debug!(resource = %config.name, ?action, "reduce");
        let before_page = self.pagination.page;
        let mut rows_changed = false;

        match action {
            Action::SetSearch(term) => {
                if !config.features.search {
                    warn!(resource = %config.name, "search is disabled, ignoring");
                } else if term != self.query.search {
                    let was = self.query.search_term().map(str::to_string);
                    self.query.search = term;
                    if self.query.search_term().map(str::to_string) != was {
                        self.pagination.page = 1;
                        rows_changed = true;
                    }
                }
            }
            Action::SetFilter { key, raw } => match config.field(&key) {
                Some(field) if config.is_filterable(&key) => {
                    let next = if raw.trim().is_empty() {
                        None
                    } else {
                        Some(FilterOp::parse(field.kind, &raw))
                    };
                    if self.query.filters.get(&key) != next.as_ref() {
                        match next {
                            Some(op) => {
                                self.query.filters.insert(key, op);
                            }
                            None => {
                                self.query.filters.remove(&key);
                            }
                        }
                        self.pagination.page = 1;
                        rows_changed = true;
                    }
                }
                _ => warn!(resource = %config.name, field = %key, "not a filterable field, ignoring"),
            },
            Action::ClearFilter(key) => {
                if self.query.filters.remove(&key).is_some() {
                    self.pagination.page = 1;
                    rows_changed = true;
                }
            }
            Action::ClearFilters => {
                if !self.query.filters.is_empty() {
                    self.query.filters.clear();
                    self.pagination.page = 1;
                    rows_changed = true;
                }
            }
            Action::SortHeaderClick(key) => {
                if config.is_sortable(&key) {
                    self.query.sort = SortSpec::cycle(self.query.sort.as_ref(), &key);
                    self.pagination.page = 1;
                    rows_changed = true;
                } else {
                    warn!(resource = %config.name, field = %key, "not a sortable field, ignoring");
                }
            }
            Action::GoToPage(page) => self.pagination.page = page,
            Action::NextPage => self.pagination.page = self.pagination.page.saturating_add(1),
            Action::PrevPage => self.pagination.page = self.pagination.page.saturating_sub(1),
            Action::SetPageSize(size) => {
                if size == 0 {
                    warn!(resource = %config.name, "page size must be at least 1, ignoring");
                } else if size != self.pagination.page_size {
                    // keep the first row of the current page in view
                    let first = (self.pagination.page.max(1) - 1) * self.pagination.page_size;
                    self.pagination = PaginationState {
                        page: first / size + 1,
                        page_size: size,
                    };
                    rows_changed = true;
                }
            }
            Action::ToggleSelect(id) => {
                // a page-scoped selection only ever holds rows on the current page
                let selectable = match config.selection_scope {
                    SelectionScope::Page => self.visible_ids(records, config).contains(&id),
                    SelectionScope::Persistent => records.iter().any(|r| r.id() == id),
                };
                if selectable {
                    self.selection.toggle(id);
                } else {
                    warn!(resource = %config.name, ?id, "record is not selectable here, ignoring");
                }
            }
            Action::SelectAllVisible => {
                let visible = self.visible_ids(records, config);
                self.selection.select_all(&visible);
            }
            Action::ClearSelection => self.selection.clear(),
            Action::RecordsChanged => {
                self.selection
                    .retain(|id| records.iter().any(|r| &r.id() == id));
            }
        }

        let total = self.visible(records, config).len();
        self.pagination = self.pagination.clamped(total);
        if self.pagination.page != before_page {
            rows_changed = true;
        }

        if rows_changed && config.selection_scope == SelectionScope::Page && !self.selection.is_empty() {
            debug!(resource = %config.name, "visible rows changed, clearing page selection");
            self.selection.clear();
        }

        self
    }
}
