//! # Resource configuration
//!
//! A [`ResourceConfig`] is composed once per resource page and never changes
//! afterwards. It carries the ordered field descriptors, the behaviour flags
//! the page honours, and the row/bulk actions it offers.
//!
//! Construction goes through [`ResourceConfig::builder`], whose `build()`
//! checks the descriptors hang together (unique keys, enum options only on
//! enum fields, a usable page size).

use crate::error::{EngineError, Result};
use crate::fields::{FieldSpec, Participation, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub search: bool,
    pub filters: bool,
    pub pagination: bool,
    pub bulk_actions: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            search: true,
            filters: true,
            pagination: true,
            bulk_actions: true,
        }
    }
}

/// Whether selections survive a change of the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionScope {
    /// Cleared whenever search, filters, sort, page or page size change.
    #[default]
    Page,
    /// Kept until explicitly cleared; only pruned when records disappear.
    Persistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    View,
    Edit,
    Delete,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::View => "View",
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
        }
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Delete,
    Export,
}

impl BulkAction {
    pub fn label(&self) -> &'static str {
        match self {
            BulkAction::Delete => "Delete selected",
            BulkAction::Export => "Export selected",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub name: String,
    /// Singular display name, e.g. "user" for "users".
    pub singular: String,
    pub id_key: String,
    pub fields: Vec<FieldSpec>,
    pub features: Features,
    pub page_size: usize,
    /// False when `page_size` is only the library default.
    page_size_set: bool,
    pub selection_scope: SelectionScope,
    pub row_actions: Vec<RowAction>,
    pub bulk_actions: Vec<BulkAction>,
}

impl ResourceConfig {
    pub fn builder(name: impl Into<String>) -> ResourceConfigBuilder {
        ResourceConfigBuilder::new(name)
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields taking part in `part`, in declaration order.
    pub fn fields_in(&self, part: Participation) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(move |f| f.participates_in(part))
    }

    pub fn is_sortable(&self, key: &str) -> bool {
        self.field(key).is_some_and(|f| f.sortable)
    }

    pub fn is_filterable(&self, key: &str) -> bool {
        self.features.filters && self.field(key).is_some_and(|f| f.filterable)
    }

    pub fn has_row_action(&self, action: RowAction) -> bool {
        self.row_actions.contains(&action)
    }

    pub fn has_bulk_action(&self, action: BulkAction) -> bool {
        self.features.bulk_actions && self.bulk_actions.contains(&action)
    }

    /// The resource's own page size, or `fallback` when it never set one.
    pub fn page_size_or(&self, fallback: usize) -> usize {
        if self.page_size_set || fallback == 0 {
            self.page_size
        } else {
            fallback
        }
    }
}

pub struct ResourceConfigBuilder {
    name: String,
    singular: Option<String>,
    id_key: String,
    fields: Vec<FieldSpec>,
    features: Features,
    page_size: Option<usize>,
    selection_scope: SelectionScope,
    row_actions: Vec<RowAction>,
    bulk_actions: Vec<BulkAction>,
}

impl ResourceConfigBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            singular: None,
            id_key: "id".to_string(),
            fields: Vec::new(),
            features: Features::default(),
            page_size: None,
            selection_scope: SelectionScope::default(),
            row_actions: vec![RowAction::View, RowAction::Edit, RowAction::Delete],
            bulk_actions: vec![BulkAction::Delete, BulkAction::Export],
        }
    }

    pub fn singular(mut self, singular: impl Into<String>) -> Self {
        self.singular = Some(singular.into());
        self
    }

    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn search(mut self, enabled: bool) -> Self {
        self.features.search = enabled;
        self
    }

    pub fn filters(mut self, enabled: bool) -> Self {
        self.features.filters = enabled;
        self
    }

    pub fn pagination(mut self, enabled: bool) -> Self {
        self.features.pagination = enabled;
        self
    }

    pub fn bulk_actions_enabled(mut self, enabled: bool) -> Self {
        self.features.bulk_actions = enabled;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn selection_scope(mut self, scope: SelectionScope) -> Self {
        self.selection_scope = scope;
        self
    }

    pub fn row_actions(mut self, actions: impl IntoIterator<Item = RowAction>) -> Self {
        self.row_actions = actions.into_iter().collect();
        self
    }

    pub fn bulk_actions(mut self, actions: impl IntoIterator<Item = BulkAction>) -> Self {
        self.bulk_actions = actions.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<ResourceConfig> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "resource name must not be empty".to_string(),
            ));
        }
        if self.page_size == Some(0) {
            return Err(EngineError::InvalidConfig(format!(
                "{}: page size must be at least 1",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.key.trim().is_empty() {
                return Err(EngineError::InvalidConfig(format!(
                    "{}: field with empty key",
                    self.name
                )));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(EngineError::InvalidConfig(format!(
                    "{}: duplicate field key '{}'",
                    self.name, field.key
                )));
            }
            let is_enum = field.kind == ValueKind::Enum;
            if is_enum && field.options.is_empty() {
                return Err(EngineError::InvalidConfig(format!(
                    "{}: enum field '{}' has no options",
                    self.name, field.key
                )));
            }
            if !is_enum && !field.options.is_empty() {
                return Err(EngineError::InvalidConfig(format!(
                    "{}: field '{}' is {} but declares enum options",
                    self.name,
                    field.key,
                    field.kind.as_str()
                )));
            }
        }

        let singular = self
            .singular
            .unwrap_or_else(|| self.name.trim_end_matches('s').to_string());

        Ok(ResourceConfig {
            name: self.name,
            singular,
            id_key: self.id_key,
            fields: self.fields,
            features: self.features,
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            page_size_set: self.page_size.is_some(),
            selection_scope: self.selection_scope,
            row_actions: self.row_actions,
            bulk_actions: self.bulk_actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> FieldSpec {
        FieldSpec::new("status", "Status", ValueKind::Enum).options([("a", "A")])
    }

    #[test]
    fn builds_with_defaults() {
        let config = ResourceConfig::builder("users")
            .field(FieldSpec::new("name", "Name", ValueKind::String).sortable())
            .field(status().filterable())
            .build()
            .unwrap();

        assert_eq!(config.singular, "user");
        assert_eq!(config.id_key, "id");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.selection_scope, SelectionScope::Page);
        assert!(config.is_sortable("name"));
        assert!(!config.is_sortable("status"));
        assert!(config.is_filterable("status"));
        assert!(config.has_bulk_action(BulkAction::Export));
    }

    #[test]
    fn disabled_features_hide_filters_and_bulk_actions() {
        let config = ResourceConfig::builder("users")
            .field(status().filterable())
            .filters(false)
            .bulk_actions_enabled(false)
            .build()
            .unwrap();
        assert!(!config.is_filterable("status"));
        assert!(!config.has_bulk_action(BulkAction::Delete));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = ResourceConfig::builder("users")
            .field(FieldSpec::new("name", "Name", ValueKind::String))
            .field(FieldSpec::new("name", "Again", ValueKind::String))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn enum_options_iff_enum_kind() {
        let err = ResourceConfig::builder("users")
            .field(FieldSpec::new("status", "Status", ValueKind::Enum))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let err = ResourceConfig::builder("users")
            .field(FieldSpec::new("name", "Name", ValueKind::String).options([("a", "A")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn own_page_size_wins_over_the_fallback() {
        let plain = ResourceConfig::builder("users").build().unwrap();
        assert_eq!(plain.page_size_or(25), 25);

        let sized = ResourceConfig::builder("orders").page_size(5).build().unwrap();
        assert_eq!(sized.page_size_or(25), 5);
        assert_eq!(sized.page_size_or(0), 5);
    }

    #[test]
    fn rejects_zero_page_size_and_empty_name() {
        assert!(ResourceConfig::builder("users").page_size(0).build().is_err());
        assert!(ResourceConfig::builder("  ").build().is_err());
    }
}
