//! Create / edit forms.
//!
//! A [`FormSpec`] is derived from the fields flagged for form display. It turns
//! raw user input (strings, keyed by field) into a typed [`Draft`], collecting
//! every field-level problem in one [`ValidationErrors`] so they can be shown
//! next to their inputs.

use crate::error::ValidationErrors;
use crate::fields::{FieldSpec, FieldValue, Participation, ValueKind};
use crate::model::{Draft, Resource};
use crate::schema::ResourceConfig;
use chrono::Timelike;
use std::collections::BTreeMap;

/// Raw form input as typed by the user.
pub type FormInput = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Every required field must be filled.
    Create,
    /// Only submitted fields change; required fields may not be blanked.
    Edit,
}

#[derive(Debug, Clone)]
pub struct FormSpec {
    pub title: String,
    pub mode: FormMode,
    pub fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn create(config: &ResourceConfig) -> Self {
        Self {
            title: format!("New {}", config.singular),
            mode: FormMode::Create,
            fields: config
                .fields_in(Participation::FormDisplay)
                .cloned()
                .collect(),
        }
    }

    /// The identifier is never editable.
    pub fn edit(config: &ResourceConfig) -> Self {
        Self {
            title: format!("Edit {}", config.singular),
            mode: FormMode::Edit,
            fields: config
                .fields_in(Participation::FormDisplay)
                .filter(|f| f.key != config.id_key)
                .cloned()
                .collect(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Current values of `record` as form input, for pre-filling an edit form.
    pub fn initial_values<R: Resource>(&self, record: &R) -> FormInput {
        self.fields
            .iter()
            .filter_map(|field| {
                let value = record.field(&field.key).coerce(field.kind);
                if value.is_empty() {
                    return None;
                }
                Some((field.key.clone(), input_text(&value)))
            })
            .collect()
    }

    /// Checks and converts `input`.
    ///
    /// Keys that are not form fields are rejected. In create mode blank
    /// optional fields are left out of the draft; in edit mode they clear the
    /// stored value.
    pub fn validate(&self, input: &FormInput) -> Result<Draft, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut draft = Draft::new();

        for key in input.keys() {
            if self.field(key).is_none() {
                errors.add(key.clone(), "is not a field of this form");
            }
        }

        for field in &self.fields {
            let raw = input.get(&field.key);
            let blank = raw.map_or(true, |r| r.trim().is_empty());

            if blank {
                let missing = match self.mode {
                    FormMode::Create => field.required,
                    FormMode::Edit => field.required && raw.is_some(),
                };
                if missing {
                    errors.add(field.key.clone(), "is required");
                } else if self.mode == FormMode::Edit && raw.is_some() {
                    draft.insert(field.key.clone(), FieldValue::Empty);
                }
                continue;
            }

            let raw = raw.map(String::as_str).unwrap_or_default();
            match parse_field(field, raw) {
                Ok(value) => {
                    if let Some(message) = field.validator.and_then(|check| check(&value)) {
                        errors.add(field.key.clone(), message);
                    } else {
                        draft.insert(field.key.clone(), value);
                    }
                }
                Err(message) => errors.add(field.key.clone(), message),
            }
        }

        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(errors)
        }
    }
}

fn parse_field(field: &FieldSpec, raw: &str) -> Result<FieldValue, String> {
    let trimmed = raw.trim();
    match field.kind {
        ValueKind::Enum => field
            .options
            .iter()
            .find(|o| o.value == trimmed || o.label.eq_ignore_ascii_case(trimmed))
            .map(|o| FieldValue::text(o.value.clone()))
            .ok_or_else(|| {
                let allowed: Vec<&str> = field.options.iter().map(|o| o.value.as_str()).collect();
                format!("must be one of: {}", allowed.join(", "))
            }),
        ValueKind::Url => {
            if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                Ok(FieldValue::text(trimmed))
            } else {
                Err("must be a URL starting with http:// or https://".to_string())
            }
        }
        kind => FieldValue::parse(kind, raw).ok_or_else(|| match kind {
            ValueKind::Number => "must be a number".to_string(),
            ValueKind::Boolean => "must be yes or no".to_string(),
            ValueKind::Date => "must be a date (YYYY-MM-DD)".to_string(),
            _ => "is not valid".to_string(),
        }),
    }
}

/// Text an input box shows for a stored value.
fn input_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Bool(true) => "yes".to_string(),
        FieldValue::Bool(false) => "no".to_string(),
        FieldValue::Date(d) if d.hour() == 0 && d.minute() == 0 && d.second() == 0 => {
            d.format("%Y-%m-%d").to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;

    fn no_example_domains(value: &FieldValue) -> Option<String> {
        match value.as_str() {
            Some(s) if s.ends_with("@example.invalid") => Some("domain is not allowed".into()),
            _ => None,
        }
    }

    fn config() -> ResourceConfig {
        ResourceConfig::builder("users")
            .field(FieldSpec::new("id", "ID", ValueKind::String).form(false))
            .field(FieldSpec::new("name", "Name", ValueKind::String).required())
            .field(
                FieldSpec::new("email", "Email", ValueKind::String)
                    .required()
                    .validator(no_example_domains),
            )
            .field(FieldSpec::new("age", "Age", ValueKind::Number))
            .field(
                FieldSpec::new("role", "Role", ValueKind::Enum)
                    .options([("admin", "Administrator"), ("user", "User")]),
            )
            .field(FieldSpec::new("site", "Website", ValueKind::Url))
            .field(FieldSpec::new("joined", "Joined", ValueKind::Date))
            .field(FieldSpec::new("active", "Active", ValueKind::Boolean))
            .build()
            .unwrap()
    }

    fn input(pairs: &[(&str, &str)]) -> FormInput {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn create_requires_required_fields() {
        let form = FormSpec::create(&config());
        let errors = form.validate(&input(&[("name", "Alice")])).unwrap_err();
        assert_eq!(errors.get("email"), Some("is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn create_parses_values_by_kind() {
        let form = FormSpec::create(&config());
        let draft = form
            .validate(&input(&[
                ("name", "Alice"),
                ("email", "alice@corp.test"),
                ("age", "41"),
                ("role", "administrator"),
                ("active", "yes"),
                ("site", ""),
            ]))
            .unwrap();
        assert_eq!(draft.get("age"), Some(&FieldValue::Number(41.0)));
        assert_eq!(draft.get("role"), Some(&FieldValue::text("admin")));
        assert_eq!(draft.get("active"), Some(&FieldValue::Bool(true)));
        assert!(!draft.contains_key("site"));
    }

    #[test]
    fn collects_every_field_error() {
        let form = FormSpec::create(&config());
        let errors = form
            .validate(&input(&[
                ("name", "Alice"),
                ("email", "a@example.invalid"),
                ("age", "old"),
                ("role", "root"),
                ("site", "ftp://x"),
                ("joined", "someday"),
                ("shoe_size", "9"),
            ]))
            .unwrap_err();
        assert_eq!(errors.get("email"), Some("domain is not allowed"));
        assert_eq!(errors.get("age"), Some("must be a number"));
        assert_eq!(errors.get("role"), Some("must be one of: admin, user"));
        assert!(errors.get("site").is_some());
        assert!(errors.get("joined").is_some());
        assert_eq!(errors.get("shoe_size"), Some("is not a field of this form"));
    }

    #[test]
    fn edit_is_partial_but_cannot_blank_required() {
        let form = FormSpec::edit(&config());
        let draft = form.validate(&input(&[("age", "42")])).unwrap();
        assert_eq!(draft.len(), 1);

        let errors = form.validate(&input(&[("name", " ")])).unwrap_err();
        assert_eq!(errors.get("name"), Some("is required"));

        let draft = form.validate(&input(&[("age", "")])).unwrap();
        assert_eq!(draft.get("age"), Some(&FieldValue::Empty));
    }

    #[test]
    fn edit_form_excludes_id() {
        let config = ResourceConfig::builder("users")
            .field(FieldSpec::new("id", "ID", ValueKind::String))
            .field(FieldSpec::new("name", "Name", ValueKind::String))
            .build()
            .unwrap();
        assert!(FormSpec::create(&config).field("id").is_some());
        assert!(FormSpec::edit(&config).field("id").is_none());
    }

    #[test]
    fn initial_values_prefill_from_record() {
        let form = FormSpec::edit(&config());
        let record = Record::new("1")
            .with("name", "Alice")
            .with("active", false)
            .with("joined", "2024-02-03");
        let values = form.initial_values(&record);
        assert_eq!(values.get("name").map(String::as_str), Some("Alice"));
        assert_eq!(values.get("active").map(String::as_str), Some("no"));
        assert_eq!(values.get("joined").map(String::as_str), Some("2024-02-03"));
        assert!(!values.contains_key("age"));
    }
}
