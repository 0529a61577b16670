use std::fmt;
use thiserror::Error;

/// Field-level validation failures, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `key`. The first message for a field wins.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        let key = key.into();
        if self.get(&key).is_none() {
            self.errors.push((key, message.into()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, m)| (k.as_str(), m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(k, m)| format!("{}: {}", k, m))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid resource configuration: {0}")]
    InvalidConfig(String),

    #[error("No records selected")]
    NothingSelected,

    #[error("The {0} dialog is not open")]
    DialogNotOpen(&'static str),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_first_message() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "is required");
        errors.add("email", "must contain @");
        errors.add("name", "too long");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("is required"));
        assert_eq!(
            errors.to_string(),
            "name: is required; email: must contain @"
        );
    }

    #[test]
    fn validation_error_display_includes_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("price", "must be a number");
        let err = EngineError::Validation(errors);
        assert_eq!(err.to_string(), "Invalid input: price: must be a number");
    }
}
