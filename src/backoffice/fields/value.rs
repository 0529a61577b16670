//! Runtime field values.
//!
//! Records hand the engine a [`FieldValue`] per key. The value carries its own
//! natural ordering (numeric, chronological, lexicographic) so sorting `9, 10, 2`
//! never degrades into string order. Anything the engine cannot interpret is
//! kept as text rather than rejected.

use super::ValueKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single attribute value of a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum FieldValue {
    /// Missing or null. Rendered as the placeholder, never an error.
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Parses raw user input according to the declared kind.
    ///
    /// Blank input is `Empty`. Returns `None` when the input cannot be read as
    /// the kind (e.g. `"abc"` for a number).
    pub fn parse(kind: ValueKind, raw: &str) -> Option<FieldValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(FieldValue::Empty);
        }

        match kind {
            ValueKind::String | ValueKind::Enum | ValueKind::Url | ValueKind::TextBlock => {
                Some(FieldValue::Text(raw.to_string()))
            }
            ValueKind::Number => trimmed
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(FieldValue::Number),
            ValueKind::Boolean => match trimmed.to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "on" => Some(FieldValue::Bool(true)),
                "false" | "no" | "n" | "0" | "off" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            ValueKind::Date => parse_date(trimmed).map(FieldValue::Date),
        }
    }

    /// Reinterprets a stored value as `kind` when it arrived in another shape,
    /// such as a date kept as text. Values that do not convert are returned as-is.
    pub fn coerce(&self, kind: ValueKind) -> FieldValue {
        match (self, kind) {
            (FieldValue::Text(s), ValueKind::Number)
            | (FieldValue::Text(s), ValueKind::Boolean)
            | (FieldValue::Text(s), ValueKind::Date) => {
                FieldValue::parse(kind, s).unwrap_or_else(|| self.clone())
            }
            _ => self.clone(),
        }
    }

    /// Ordering between two values of the same shape; `None` for mismatched
    /// shapes or when either side is empty.
    pub fn partial_order(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => Some(a.total_cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Position of the value's shape in the sort order.
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Number(_) => 0,
            FieldValue::Date(_) => 1,
            FieldValue::Bool(_) => 2,
            FieldValue::Text(_) => 3,
            FieldValue::Empty => 4,
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Values are grouped by shape (numbers, dates, booleans, text, then
    /// empty) and ordered naturally within a shape, so a column holding some
    /// unparseable text still sorts consistently.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.partial_order(other).unwrap_or(Ordering::Equal))
    }

    /// Equality used by exact-match filters.
    ///
    /// Same-shape values compare directly. A text operand is compared against
    /// the other side's text form so unparsed input still matches.
    pub fn matches_exactly(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Empty, FieldValue::Empty) => true,
            (FieldValue::Empty, _) | (_, FieldValue::Empty) => false,
            (FieldValue::Text(a), b) | (b, FieldValue::Text(a)) => *a == b.to_string(),
            _ => self.partial_order(other) == Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Empty)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => FieldValue::Empty,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or_default(),
            Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(d) => FieldValue::Date(d.with_timezone(&Utc)),
                Err(_) => FieldValue::Text(s),
            },
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        use serde_json::Value;
        match value {
            FieldValue::Empty => Value::Null,
            FieldValue::Text(s) => Value::String(s),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Value::from(n as i64)
                } else {
                    serde_json::Number::from_f64(n)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Date(d) => Value::String(d.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(raw) {
        return Some(d.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn numbers_order_numerically() {
        let mut values = vec![
            FieldValue::Number(9.0),
            FieldValue::Number(10.0),
            FieldValue::Number(2.0),
        ];
        values.sort_by(|a, b| a.compare(b));
        assert_eq!(
            values,
            vec![
                FieldValue::Number(2.0),
                FieldValue::Number(9.0),
                FieldValue::Number(10.0)
            ]
        );
    }

    #[test]
    fn empty_sorts_last() {
        assert_eq!(
            FieldValue::Empty.compare(&FieldValue::text("a")),
            Ordering::Greater
        );
        assert_eq!(
            FieldValue::Number(1.0).compare(&FieldValue::Empty),
            Ordering::Less
        );
        assert_eq!(FieldValue::Empty.compare(&FieldValue::Empty), Ordering::Equal);
    }

    #[test]
    fn mixed_shapes_group_by_shape() {
        assert_eq!(
            FieldValue::Number(10.0).compare(&FieldValue::text("9")),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::text("1a").compare(&FieldValue::Number(2.0)),
            Ordering::Greater
        );
        assert_eq!(
            FieldValue::Bool(true).compare(&FieldValue::text("a")),
            Ordering::Less
        );
    }

    #[test]
    fn mixed_shapes_sort_without_cycles() {
        let mut values: Vec<FieldValue> = (0..200)
            .map(|i| {
                if i % 3 == 0 {
                    FieldValue::text(format!("{}a", i))
                } else {
                    FieldValue::Number(((i * 37) % 101) as f64)
                }
            })
            .collect();
        values.push(FieldValue::Empty);
        values.sort_by(|a, b| a.compare(b));

        for pair in values.windows(2) {
            assert_ne!(pair[0].compare(&pair[1]), Ordering::Greater);
        }
        let first_text = values.iter().position(|v| v.as_str().is_some()).unwrap();
        assert!(values[..first_text].iter().all(|v| v.as_f64().is_some()));
        assert!(values.last().unwrap().is_empty());
    }

    #[test]
    fn parse_by_kind() {
        assert_eq!(
            FieldValue::parse(ValueKind::Number, "1,250.5"),
            Some(FieldValue::Number(1250.5))
        );
        assert_eq!(FieldValue::parse(ValueKind::Number, "abc"), None);
        assert_eq!(
            FieldValue::parse(ValueKind::Boolean, "Yes"),
            Some(FieldValue::Bool(true))
        );
        assert_eq!(FieldValue::parse(ValueKind::Boolean, "maybe"), None);
        assert_eq!(
            FieldValue::parse(ValueKind::String, "  "),
            Some(FieldValue::Empty)
        );
    }

    #[test]
    fn parse_dates_in_several_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            FieldValue::parse(ValueKind::Date, "2024-03-01"),
            Some(FieldValue::Date(expected))
        );
        assert_eq!(
            FieldValue::parse(ValueKind::Date, "2024-03-01T00:00:00Z"),
            Some(FieldValue::Date(expected))
        );
        assert_eq!(FieldValue::parse(ValueKind::Date, "yesterday"), None);
    }

    #[test]
    fn display_drops_integral_fraction() {
        assert_eq!(FieldValue::Number(9.0).to_string(), "9");
        assert_eq!(FieldValue::Number(9.5).to_string(), "9.5");
        assert_eq!(FieldValue::Empty.to_string(), "");
    }

    #[test]
    fn exact_match_accepts_text_operand() {
        assert!(FieldValue::Number(3.0).matches_exactly(&FieldValue::text("3")));
        assert!(FieldValue::text("active").matches_exactly(&FieldValue::text("active")));
        assert!(!FieldValue::text("Active").matches_exactly(&FieldValue::text("active")));
        assert!(!FieldValue::Empty.matches_exactly(&FieldValue::text("")));
    }

    #[test]
    fn json_conversion_recognises_dates() {
        let v: FieldValue = serde_json::from_str("\"2024-05-02T10:00:00Z\"").unwrap();
        assert!(matches!(v, FieldValue::Date(_)));
        let v: FieldValue = serde_json::from_str("null").unwrap();
        assert!(v.is_empty());
        assert_eq!(serde_json::to_string(&FieldValue::Number(4.0)).unwrap(), "4");
    }

    #[test]
    fn coerce_reads_text_as_declared_kind() {
        assert_eq!(
            FieldValue::text("12").coerce(ValueKind::Number),
            FieldValue::Number(12.0)
        );
        assert_eq!(
            FieldValue::text("n/a").coerce(ValueKind::Number),
            FieldValue::text("n/a")
        );
    }
}
