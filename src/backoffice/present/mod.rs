//! # Presentation adapter
//!
//! Turns records + view state into plain, serialisable view models that any
//! UI can draw: [`TableView`] for the list page, [`DetailRow`]s for the view
//! dialog. It also defines the [`Intent`]s a UI sends back.
//!
//! Nothing here decides business rules or talks to a backend. View intents map
//! onto reducer [`Action`]s; row and bulk intents are routed to the
//! orchestrator.

use crate::config::DisplaySettings;
use crate::engine::{Action, SortDirection, ViewState};
use crate::fields::{EnumOption, Participation};
use crate::model::Resource;
use crate::schema::{BulkAction, ResourceConfig, RowAction};
use serde::Serialize;

pub mod cell;
pub mod controls;

pub use cell::{format_cell, format_value, truncate_to_width, Cell, CellStyle};
pub use controls::{PageControls, PageLink};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
    /// `▲`, `▼` or empty.
    pub indicator: &'static str,
    pub numeric: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterControl {
    pub key: String,
    pub label: String,
    /// Current filter input, as the user would type it.
    pub value: Option<String>,
    pub options: Vec<EnumOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView<Id> {
    pub id: Id,
    pub selected: bool,
    pub cells: Vec<Cell>,
    pub actions: Vec<RowAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView<Id> {
    pub resource: String,
    /// `None` when search is disabled for the resource.
    pub search: Option<String>,
    pub filters: Vec<FilterControl>,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RowView<Id>>,
    /// `None` when pagination is disabled.
    pub controls: Option<PageControls>,
    pub total_count: usize,
    pub selected_count: usize,
    /// State of the "select all" checkbox.
    pub all_visible_selected: bool,
    pub bulk_actions: Vec<BulkAction>,
    pub empty_message: Option<String>,
}

/// Builds the list page for the current view state.
pub fn build_table<R: Resource>(
    records: &[R],
    state: &ViewState<R::Id>,
    config: &ResourceConfig,
    settings: &DisplaySettings,
) -> TableView<R::Id> {
    let page = state.page(records, config);
    let columns: Vec<_> = config.fields_in(Participation::TableDisplay).collect();

    let headers = columns
        .iter()
        .map(|field| {
            let sort = state
                .query
                .sort
                .as_ref()
                .filter(|s| s.key == field.key)
                .map(|s| s.direction);
            HeaderCell {
                key: field.key.clone(),
                label: field.label.clone(),
                sortable: field.sortable,
                sort,
                indicator: sort.map(|d| d.indicator()).unwrap_or(""),
                numeric: field.kind == crate::fields::ValueKind::Number,
            }
        })
        .collect();

    let rows: Vec<RowView<R::Id>> = page
        .items
        .iter()
        .map(|record| {
            let id = record.id();
            RowView {
                selected: state.selection.is_selected(&id),
                cells: columns
                    .iter()
                    .map(|field| format_cell(field, &record.field(&field.key), settings))
                    .collect(),
                actions: config.row_actions.clone(),
                id,
            }
        })
        .collect();

    let visible_ids: Vec<R::Id> = rows.iter().map(|r| r.id.clone()).collect();

    let filters = if config.features.filters {
        config
            .fields_in(Participation::Filter)
            .map(|field| FilterControl {
                key: field.key.clone(),
                label: field.label.clone(),
                value: state.query.filters.get(&field.key).map(|op| op.to_string()),
                options: field.options.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let bulk_actions = config
        .bulk_actions
        .iter()
        .copied()
        .filter(|a| config.has_bulk_action(*a))
        .collect();

    let empty_message = if page.total_count > 0 {
        None
    } else if records.is_empty() {
        Some(format!("No {} yet.", config.name))
    } else {
        Some(format!("No {} match the current search and filters.", config.name))
    };

    TableView {
        resource: config.name.clone(),
        search: config.features.search.then(|| state.query.search.clone()),
        filters,
        headers,
        controls: config
            .features
            .pagination
            .then(|| PageControls::from_slice(&page)),
        total_count: page.total_count,
        selected_count: state.selection.len(),
        all_visible_selected: state.selection.covers(&visible_ids),
        rows,
        bulk_actions,
        empty_message,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub key: String,
    pub label: String,
    pub value: Cell,
}

/// Label/value rows for the view dialog, untruncated.
pub fn build_detail<R: Resource>(
    record: &R,
    config: &ResourceConfig,
    settings: &DisplaySettings,
) -> Vec<DetailRow> {
    config
        .fields_in(Participation::ViewDisplay)
        .map(|field| DetailRow {
            key: field.key.clone(),
            label: field.label.clone(),
            value: format_value(field, &record.field(&field.key), settings),
        })
        .collect()
}

/// What the user did on the list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent<Id> {
    SearchChanged(String),
    FilterChanged { key: String, raw: String },
    SortHeaderClicked(String),
    PageChanged(usize),
    PageSizeChanged(usize),
    RowAction(RowAction, Id),
    BulkAction(BulkAction),
    SelectToggled(Id),
    SelectAllToggled,
}

impl<Id> Intent<Id> {
    /// The reducer action for view intents; `None` for row and bulk actions,
    /// which the orchestrator handles.
    pub fn into_action(self) -> Option<Action<Id>> {
        match self {
            Intent::SearchChanged(term) => Some(Action::SetSearch(term)),
            Intent::FilterChanged { key, raw } => Some(Action::SetFilter { key, raw }),
            Intent::SortHeaderClicked(key) => Some(Action::SortHeaderClick(key)),
            Intent::PageChanged(page) => Some(Action::GoToPage(page)),
            Intent::PageSizeChanged(size) => Some(Action::SetPageSize(size)),
            Intent::SelectToggled(id) => Some(Action::ToggleSelect(id)),
            Intent::SelectAllToggled => Some(Action::SelectAllVisible),
            Intent::RowAction(..) | Intent::BulkAction(_) => None,
        }
    }
}
