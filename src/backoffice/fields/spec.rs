//! Field descriptors.
//!
//! A [`FieldSpec`] describes one attribute of a record: its key, label, value
//! kind, and which parts of the page it takes part in (search, sort, filters,
//! table, forms, detail view).

use super::FieldValue;
use crate::config::DisplaySettings;
use serde::{Deserialize, Serialize};

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Date,
    /// Closed set of values with display labels.
    Enum,
    Url,
    /// Multi-line free text.
    TextBlock,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::Enum => "enum",
            ValueKind::Url => "url",
            ValueKind::TextBlock => "text",
        }
    }
}

/// The parts of a resource page a field can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participation {
    Search,
    Sort,
    Filter,
    TableDisplay,
    FormDisplay,
    ViewDisplay,
}

/// One allowed value of an enum field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub value: String,
    pub label: String,
}

impl EnumOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Custom validation hook; returns a message when the value is rejected.
pub type Validator = fn(&FieldValue) -> Option<String>;

/// Custom cell formatter, replacing the kind-based formatting.
pub type CellFormatter = fn(&FieldValue, &DisplaySettings) -> String;

/// Keys treated as money when a number field does not say otherwise.
const CURRENCY_KEYS: &[&str] = &[
    "price", "amount", "total", "cost", "revenue", "balance", "salary", "fee",
];
const CURRENCY_SUFFIXES: &[&str] = &["_price", "_amount", "_total", "_cost"];

/// Descriptor for a single field of a resource.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub kind: ValueKind,
    pub searchable: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub in_table: bool,
    pub in_form: bool,
    pub in_view: bool,
    pub required: bool,
    /// Present iff `kind` is `Enum`.
    pub options: Vec<EnumOption>,
    /// `None` defers to the key convention.
    pub currency: Option<bool>,
    pub validator: Option<Validator>,
    pub formatter: Option<CellFormatter>,
}

impl FieldSpec {
    /// A field shown in the table, forms and detail view, taking part in
    /// nothing else until enabled.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            searchable: false,
            sortable: false,
            filterable: false,
            in_table: true,
            in_form: true,
            in_view: true,
            required: false,
            options: Vec::new(),
            currency: None,
            validator: None,
            formatter: None,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn table(mut self, shown: bool) -> Self {
        self.in_table = shown;
        self
    }

    pub fn form(mut self, shown: bool) -> Self {
        self.in_form = shown;
        self
    }

    pub fn view(mut self, shown: bool) -> Self {
        self.in_view = shown;
        self
    }

    pub fn options<V, L>(mut self, options: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(v, l)| EnumOption::new(v, l))
            .collect();
        self
    }

    pub fn currency(mut self, currency: bool) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn formatter(mut self, formatter: CellFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn participates_in(&self, part: Participation) -> bool {
        match part {
            Participation::Search => self.searchable,
            Participation::Sort => self.sortable,
            Participation::Filter => self.filterable,
            Participation::TableDisplay => self.in_table,
            Participation::FormDisplay => self.in_form,
            Participation::ViewDisplay => self.in_view,
        }
    }

    /// Display label for an enum value.
    pub fn label_for(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }

    pub fn is_currency(&self) -> bool {
        if self.kind != ValueKind::Number {
            return false;
        }
        self.currency.unwrap_or_else(|| {
            let key = self.key.to_lowercase();
            CURRENCY_KEYS.contains(&key.as_str())
                || CURRENCY_SUFFIXES.iter().any(|s| key.ends_with(s))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_is_displayed_but_inert() {
        let field = FieldSpec::new("name", "Name", ValueKind::String);
        assert!(field.participates_in(Participation::TableDisplay));
        assert!(field.participates_in(Participation::FormDisplay));
        assert!(field.participates_in(Participation::ViewDisplay));
        assert!(!field.participates_in(Participation::Search));
        assert!(!field.participates_in(Participation::Sort));
        assert!(!field.participates_in(Participation::Filter));
    }

    #[test]
    fn builder_flags() {
        let field = FieldSpec::new("bio", "Bio", ValueKind::TextBlock)
            .searchable()
            .table(false)
            .required();
        assert!(field.searchable);
        assert!(!field.in_table);
        assert!(field.required);
    }

    #[test]
    fn enum_label_lookup() {
        let field = FieldSpec::new("status", "Status", ValueKind::Enum)
            .options([("active", "Active"), ("inactive", "Inactive")]);
        assert_eq!(field.label_for("active"), Some("Active"));
        assert_eq!(field.label_for("archived"), None);
    }

    #[test]
    fn currency_follows_key_convention() {
        assert!(FieldSpec::new("price", "Price", ValueKind::Number).is_currency());
        assert!(FieldSpec::new("unit_price", "Unit", ValueKind::Number).is_currency());
        assert!(FieldSpec::new("Total", "Total", ValueKind::Number).is_currency());
        assert!(!FieldSpec::new("stock", "Stock", ValueKind::Number).is_currency());
        assert!(!FieldSpec::new("price", "Price", ValueKind::String).is_currency());
    }

    #[test]
    fn explicit_currency_flag_wins() {
        assert!(!FieldSpec::new("price", "Price", ValueKind::Number)
            .currency(false)
            .is_currency());
        assert!(FieldSpec::new("deposit", "Deposit", ValueKind::Number)
            .currency(true)
            .is_currency());
    }
}
