//! Field filters.
//!
//! A filter is keyed by field and holds one [`FilterOp`]. Operators are
//! resolved against the field's [`ValueKind`]: ranges only make sense for
//! numbers and dates, `Contains` only for text-like kinds. A filter that cannot
//! be evaluated matches nothing instead of failing.

use super::{FieldValue, ValueKind};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Exact equality.
    Eq(FieldValue),
    /// Case-insensitive substring.
    Contains(String),
    /// Inclusive range; either bound may be open.
    Range {
        min: Option<FieldValue>,
        max: Option<FieldValue>,
    },
    /// Equal to any of the listed values.
    OneOf(Vec<FieldValue>),
    /// Input that could not be read for the field's kind. Matches nothing.
    Invalid(String),
}

impl FilterOp {
    /// Builds an operator from filter-control input.
    ///
    /// - `a..b`, `a..`, `..b`: range (numbers and dates)
    /// - `~text`: substring
    /// - `a|b|c`: any of
    /// - anything else: equality
    pub fn parse(kind: ValueKind, raw: &str) -> FilterOp {
        let raw = raw.trim();

        if let Some(needle) = raw.strip_prefix('~') {
            return FilterOp::Contains(needle.to_string());
        }

        if matches!(kind, ValueKind::Number | ValueKind::Date) {
            if let Some((lo, hi)) = raw.split_once("..") {
                let bound = |s: &str| -> Result<Option<FieldValue>, ()> {
                    if s.trim().is_empty() {
                        return Ok(None);
                    }
                    match FieldValue::parse(kind, s) {
                        Some(FieldValue::Empty) | None => Err(()),
                        Some(v) => Ok(Some(v)),
                    }
                };
                return match (bound(lo), bound(hi)) {
                    (Ok(min), Ok(max)) => FilterOp::Range { min, max },
                    _ => FilterOp::Invalid(raw.to_string()),
                };
            }
        }

        if raw.contains('|') {
            let parsed: Option<Vec<FieldValue>> = raw
                .split('|')
                .map(|part| FieldValue::parse(kind, part.trim()))
                .collect();
            return match parsed {
                Some(values) => FilterOp::OneOf(values),
                None => FilterOp::Invalid(raw.to_string()),
            };
        }

        match FieldValue::parse(kind, raw) {
            Some(value) => FilterOp::Eq(value),
            None => FilterOp::Invalid(raw.to_string()),
        }
    }

    /// Checks a record's value against this operator.
    pub fn matches(&self, value: &FieldValue) -> bool {
        match self {
            FilterOp::Eq(expected) => value.matches_exactly(expected),
            FilterOp::Contains(needle) => {
                if value.is_empty() {
                    return false;
                }
                value
                    .to_string()
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            }
            FilterOp::Range { min, max } => {
                if value.is_empty() {
                    return false;
                }
                let above_min = match min {
                    Some(lo) => matches!(
                        value.partial_order(lo),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    None => true,
                };
                let below_max = match max {
                    Some(hi) => matches!(
                        value.partial_order(hi),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                    None => true,
                };
                above_min && below_max
            }
            FilterOp::OneOf(options) => options.iter().any(|o| value.matches_exactly(o)),
            FilterOp::Invalid(_) => false,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Eq(v) => write!(f, "{}", v),
            FilterOp::Contains(s) => write!(f, "~{}", s),
            FilterOp::Range { min, max } => {
                let lo = min.as_ref().map(|v| v.to_string()).unwrap_or_default();
                let hi = max.as_ref().map(|v| v.to_string()).unwrap_or_default();
                write!(f, "{}..{}", lo, hi)
            }
            FilterOp::OneOf(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join("|"))
            }
            FilterOp::Invalid(raw) => write!(f, "{}", raw),
        }
    }
}
