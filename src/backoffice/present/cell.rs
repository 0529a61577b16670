//! Type-aware cell formatting.
//!
//! Formatting never fails: a value that cannot be shown as its declared kind
//! renders as the configured placeholder.

use crate::config::{is_valid_strftime, DisplaySettings};
use crate::fields::{FieldSpec, FieldValue, ValueKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    Plain,
    /// The empty placeholder.
    Placeholder,
    Yes,
    No,
    /// Numbers and currency; right-aligned by table renderers.
    Numeric,
    Date,
    Badge,
    Link,
}

impl CellStyle {
    pub fn right_aligned(&self) -> bool {
        matches!(self, CellStyle::Numeric)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub text: String,
    pub style: CellStyle,
}

impl Cell {
    fn new(text: impl Into<String>, style: CellStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Formats a value for display, without width limits.
pub fn format_value(field: &FieldSpec, value: &FieldValue, settings: &DisplaySettings) -> Cell {
    let placeholder = || Cell::new(settings.empty_placeholder.clone(), CellStyle::Placeholder);

    if value.is_empty() {
        return placeholder();
    }
    if let Some(custom) = field.formatter {
        return Cell::new(custom(value, settings), CellStyle::Plain);
    }

    let value = value.coerce(field.kind);
    match (field.kind, &value) {
        (ValueKind::Boolean, FieldValue::Bool(true)) => {
            Cell::new(settings.yes_label.clone(), CellStyle::Yes)
        }
        (ValueKind::Boolean, FieldValue::Bool(false)) => {
            Cell::new(settings.no_label.clone(), CellStyle::No)
        }
        (ValueKind::Date, FieldValue::Date(date)) => {
            Cell::new(format_date(*date, settings), CellStyle::Date)
        }
        (ValueKind::Number, FieldValue::Number(n)) => {
            let text = if field.is_currency() {
                format_currency(*n, settings)
            } else {
                format_number(*n, settings.number_decimals, &settings.thousands_separator)
            };
            Cell::new(text, CellStyle::Numeric)
        }
        (ValueKind::Enum, other) => {
            let raw = other.to_string();
            match field.label_for(&raw) {
                Some(label) => Cell::new(label, CellStyle::Badge),
                None => Cell::new(raw, CellStyle::Plain),
            }
        }
        (ValueKind::Url, FieldValue::Text(url)) => Cell::new(url.clone(), CellStyle::Link),
        (ValueKind::TextBlock, FieldValue::Text(text)) => {
            let one_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
            Cell::new(one_line, CellStyle::Plain)
        }
        (ValueKind::String, other) => Cell::new(other.to_string(), CellStyle::Plain),
        // value did not convert to its declared kind
        _ => placeholder(),
    }
}

/// Formats a value for a table cell, truncated to `max_cell_width`.
pub fn format_cell(field: &FieldSpec, value: &FieldValue, settings: &DisplaySettings) -> Cell {
    let mut cell = format_value(field, value, settings);
    cell.text = truncate_to_width(&cell.text, settings.max_cell_width);
    cell
}

/// Cuts `s` to at most `max_width` columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let limit = max_width.saturating_sub(1);
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

pub fn format_date(date: DateTime<Utc>, settings: &DisplaySettings) -> String {
    if settings.relative_dates {
        let now = Utc::now();
        let formatter = timeago::Formatter::new();
        return match now.signed_duration_since(date).to_std() {
            Ok(elapsed) => formatter.convert(elapsed),
            // future dates
            Err(_) => absolute_date(date, &settings.date_format),
        };
    }
    absolute_date(date, &settings.date_format)
}

fn absolute_date(date: DateTime<Utc>, pattern: &str) -> String {
    if is_valid_strftime(pattern) {
        date.format(pattern).to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

/// Groups the digits of a non-negative integer string.
fn group_digits(digits: &str, separator: &str) -> String {
    if separator.is_empty() || digits.len() <= 3 {
        return digits.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

fn split_fixed(n: f64, decimals: usize) -> (bool, String, String) {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (fixed, String::new()),
    };
    let negative = n < 0.0 && (int_part.chars().chain(frac_part.chars()).any(|c| c != '0'));
    (negative, int_part, frac_part)
}

/// Plain number with at most `max_decimals` fraction digits (trailing zeros dropped).
pub fn format_number(n: f64, max_decimals: usize, separator: &str) -> String {
    let (negative, int_part, frac_part) = split_fixed(n, max_decimals);
    let frac_part = frac_part.trim_end_matches('0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_digits(&int_part, separator));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Currency amount with a fixed number of fraction digits, e.g. `-$1,234.50`.
pub fn format_currency(n: f64, settings: &DisplaySettings) -> String {
    let (negative, int_part, frac_part) = split_fixed(n, settings.currency_decimals);
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&settings.currency_symbol);
    out.push_str(&group_digits(&int_part, &settings.thousands_separator));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }
    out
}
