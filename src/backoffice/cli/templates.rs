//! # CLI Templates
//!
//! Terminal output is rendered from minijinja templates kept in stand-alone
//! files under `templates/`, included here as string constants.
//!
//! Conventions:
//!
//! 1. Line breaks are explicit (`{{ "\n" }}`) and tags trim their surrounding
//!    whitespace, so the template source can be laid out for reading.
//! 2. Widths, padding and truncation are computed in Rust. Templates only pick
//!    what to print and which named style to print it with.
//! 3. Style names arrive as data (`cell.style`) instead of being chosen with
//!    conditionals in the template.

pub const LIST_TEMPLATE: &str = include_str!("templates/list.tmp");
pub const DETAIL_TEMPLATE: &str = include_str!("templates/detail.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
pub const RESOURCES_TEMPLATE: &str = include_str!("templates/resources.tmp");
pub const SETTINGS_TEMPLATE: &str = include_str!("templates/settings.tmp");
