//! Query pipeline: search, filter, sort, then paginate.
//!
//! Both stages are pure functions of their inputs and never fail. Bad filter
//! input shows up as rows not matching, never as an error.

use crate::fields::{FieldValue, FilterOp, ValueKind};
use crate::model::Resource;
use crate::schema::ResourceConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Next sort after a click on `key`'s header.
    ///
    /// Same column: unsorted → asc → desc → unsorted. A different column
    /// always starts at asc.
    pub fn cycle(current: Option<&SortSpec>, key: &str) -> Option<SortSpec> {
        match current {
            Some(spec) if spec.key == key => match spec.direction {
                SortDirection::Asc => Some(SortSpec::desc(key)),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec::asc(key)),
        }
    }
}

/// Search term, active filters and sort for one resource page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub search: String,
    pub filters: BTreeMap<String, FilterOp>,
    pub sort: Option<SortSpec>,
}

impl QueryState {
    /// The trimmed search term, `None` when it is blank.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    /// True when nothing narrows or reorders the collection.
    pub fn is_identity(&self) -> bool {
        self.search_term().is_none() && self.filters.is_empty() && self.sort.is_none()
    }
}

fn kind_of(config: &ResourceConfig, key: &str) -> Option<ValueKind> {
    config.field(key).map(|f| f.kind)
}

fn read<R: Resource>(record: &R, key: &str, kind: Option<ValueKind>) -> FieldValue {
    let value = record.field(key);
    match kind {
        Some(kind) => value.coerce(kind),
        None => value,
    }
}

/// Whether `record` contains `needle` (already lower-cased) in any searchable field.
fn matches_search<R: Resource>(record: &R, needle: &str, config: &ResourceConfig) -> bool {
    config.fields.iter().filter(|f| f.searchable).any(|field| {
        let value = record.field(&field.key);
        if value.is_empty() {
            return false;
        }
        let raw = value.to_string();
        if raw.to_lowercase().contains(needle) {
            return true;
        }
        raw_label(field, &raw).is_some_and(|label| label.to_lowercase().contains(needle))
    })
}

fn raw_label<'a>(field: &'a crate::fields::FieldSpec, raw: &str) -> Option<&'a str> {
    if field.kind == ValueKind::Enum {
        field.label_for(raw)
    } else {
        None
    }
}

/// Filters and sorts `records` according to `query`.
///
/// Search and filters combine with AND. Without a sort the original order is
/// kept; sorting is stable.
pub fn compute_visible<'a, R: Resource>(
    records: &'a [R],
    query: &QueryState,
    config: &ResourceConfig,
) -> Vec<&'a R> {
    let needle = if config.features.search {
        query.search_term().map(str::to_lowercase)
    } else {
        None
    };
    let filters: Vec<(&str, Option<ValueKind>, &FilterOp)> = if config.features.filters {
        query
            .filters
            .iter()
            .map(|(key, op)| (key.as_str(), kind_of(config, key), op))
            .collect()
    } else {
        Vec::new()
    };

    let mut visible: Vec<&R> = records
        .iter()
        .filter(|record| match &needle {
            Some(needle) => matches_search(*record, needle, config),
            None => true,
        })
        .filter(|record| {
            filters
                .iter()
                .all(|(key, kind, op)| op.matches(&read(*record, key, *kind)))
        })
        .collect();

    if let Some(sort) = &query.sort {
        let kind = kind_of(config, &sort.key);
        visible.sort_by(|a, b| {
            let left = read(*a, &sort.key, kind);
            let right = read(*b, &sort.key, kind);
            match sort.direction {
                SortDirection::Asc => left.compare(&right),
                SortDirection::Desc => right.compare(&left),
            }
        });
    }

    visible
}

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page: usize,
    pub page_size: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Moves the page into `[1, max(1, total_pages)]`.
    pub fn clamped(self, total_count: usize) -> Self {
        let last = total_pages(total_count, self.page_size).max(1);
        Self {
            page: self.page.clamp(1, last),
            page_size: self.page_size,
        }
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(crate::schema::DEFAULT_PAGE_SIZE)
    }
}

pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    total_count.div_ceil(page_size.max(1))
}

/// One page of a filtered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

impl<T> PageSlice<T> {
    /// Index of the first item of this page within the whole collection.
    pub fn start_index(&self) -> usize {
        (self.page.max(1) - 1) * self.page_size
    }
}

/// Cuts the requested page out of `items`.
///
/// No clamping happens here: a page past the end is an empty slice.
pub fn paginate<T: Clone>(items: &[T], pagination: PaginationState) -> PageSlice<T> {
    let page_size = pagination.page_size.max(1);
    let page = pagination.page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    let slice = if start >= items.len() {
        Vec::new()
    } else {
        let end = (start + page_size).min(items.len());
        items[start..end].to_vec()
    };
    PageSlice {
        items: slice,
        page,
        page_size,
        total_pages: total_pages(items.len(), page_size),
        total_count: items.len(),
    }
}
