//! Named terminal styles used by the templates' `style` filter.

use backoffice::notice::NoticeLevel;
use backoffice::present::CellStyle;
use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Shown before text whose style name is not registered, to catch template typos.
const MISSING_STYLE_INDICATOR: &str = "(!?)";

pub mod names {
    pub const TITLE: &str = "title";
    pub const LABEL: &str = "label";
    pub const HEADER: &str = "header";
    pub const HEADER_SORTED: &str = "header_sorted";
    pub const MUTED: &str = "muted";
    pub const SELECTED: &str = "selected";

    pub const PLAIN: &str = "plain";
    pub const PLACEHOLDER: &str = "placeholder";
    pub const YES: &str = "yes";
    pub const NO: &str = "no";
    pub const NUMERIC: &str = "numeric";
    pub const DATE: &str = "date";
    pub const BADGE: &str = "badge";
    pub const LINK: &str = "link";

    pub const INFO: &str = "info";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
}

#[derive(Clone, Default)]
pub struct Theme {
    styles: HashMap<&'static str, Style>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &'static str, style: Style) -> Self {
        self.styles.insert(name, style);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Styles `text`, or returns it unchanged when `use_color` is off.
    pub fn apply(&self, name: &str, text: &str, use_color: bool) -> String {
        match self.styles.get(name) {
            Some(style) if use_color => style.apply_to(text).to_string(),
            Some(_) => text.to_string(),
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    }
}

pub static BACKOFFICE_THEME: Lazy<Theme> = Lazy::new(|| {
    Theme::new()
        .add(names::TITLE, Style::new().bold())
        .add(names::LABEL, Style::new().cyan())
        .add(names::HEADER, Style::new().bold())
        .add(names::HEADER_SORTED, Style::new().bold().underlined())
        .add(names::MUTED, Style::new().dim())
        .add(names::SELECTED, Style::new().yellow())
        .add(names::PLAIN, Style::new())
        .add(names::PLACEHOLDER, Style::new().dim())
        .add(names::YES, Style::new().green())
        .add(names::NO, Style::new().red())
        .add(names::NUMERIC, Style::new())
        .add(names::DATE, Style::new().color256(247))
        .add(names::BADGE, Style::new().magenta())
        .add(names::LINK, Style::new().blue().underlined())
        .add(names::INFO, Style::new().dim())
        .add(names::SUCCESS, Style::new().green())
        .add(names::WARNING, Style::new().yellow())
        .add(names::ERROR, Style::new().red())
});

pub fn cell_style(style: CellStyle) -> &'static str {
    match style {
        CellStyle::Plain => names::PLAIN,
        CellStyle::Placeholder => names::PLACEHOLDER,
        CellStyle::Yes => names::YES,
        CellStyle::No => names::NO,
        CellStyle::Numeric => names::NUMERIC,
        CellStyle::Date => names::DATE,
        CellStyle::Badge => names::BADGE,
        CellStyle::Link => names::LINK,
    }
}

pub fn notice_style(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => names::INFO,
        NoticeLevel::Success => names::SUCCESS,
        NoticeLevel::Warning => names::WARNING,
        NoticeLevel::Error => names::ERROR,
    }
}
