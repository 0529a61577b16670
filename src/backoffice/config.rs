//! # Display settings
//!
//! Preferences the presentation adapter consults when formatting cells. They
//! are managed by [`confique`], which merges partial files with the compiled
//! defaults.
//!
//! ## Storage Hierarchy
//!
//! Settings are resolved in priority order:
//! 1. **Environment variables**: `BACKOFFICE_DATE_FORMAT`, `BACKOFFICE_CURRENCY_SYMBOL`, ...
//! 2. **Project file**: `.backoffice/backoffice.toml`
//! 3. **Global file**: OS-appropriate config directory (via `directories` in the CLI)
//! 4. **Compiled defaults**: `#[config(default = ...)]`
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `date_format` | `%Y-%m-%d` | strftime pattern for date cells |
//! | `relative_dates` | `false` | Render dates as "3 days ago" |
//! | `currency_symbol` | `$` | Prefix for currency cells |
//! | `currency_decimals` | `2` | Fraction digits for currency |
//! | `number_decimals` | `2` | Max fraction digits for plain numbers |
//! | `thousands_separator` | `,` | Digit grouping for numbers and currency |
//! | `table_density` | `comfortable` | `compact` or `comfortable` |
//! | `page_size` | `10` | Rows per page when a resource does not set one |
//! | `yes_label` / `no_label` | `Yes` / `No` | Boolean cell labels |
//! | `empty_placeholder` | `—` | Shown for missing values |
//! | `max_cell_width` | `32` | Cells are truncated to this display width |

use crate::error::{EngineError, Result};
use chrono::format::{Item, StrftimeItems};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const SETTINGS_FILENAME: &str = "backoffice.toml";
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDensity {
    Compact,
    #[default]
    Comfortable,
}

impl TableDensity {
    /// Spaces between table columns.
    pub fn column_gap(&self) -> usize {
        match self {
            TableDensity::Compact => 1,
            TableDensity::Comfortable => 3,
        }
    }
}

impl fmt::Display for TableDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableDensity::Compact => f.write_str("compact"),
            TableDensity::Comfortable => f.write_str("comfortable"),
        }
    }
}

/// Display preferences, stored in `backoffice.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    /// strftime pattern used for date cells.
    #[config(default = "%Y-%m-%d", env = "BACKOFFICE_DATE_FORMAT")]
    pub date_format: String,

    /// Render dates relative to now ("3 days ago") instead of formatting them.
    #[config(default = false)]
    pub relative_dates: bool,

    /// Symbol placed before currency amounts.
    #[config(default = "$", env = "BACKOFFICE_CURRENCY_SYMBOL")]
    pub currency_symbol: String,

    /// Fraction digits for currency amounts.
    #[config(default = 2)]
    pub currency_decimals: usize,

    /// Maximum fraction digits for plain numbers.
    #[config(default = 2)]
    pub number_decimals: usize,

    /// Digit grouping separator. Empty disables grouping.
    #[config(default = ",")]
    pub thousands_separator: String,

    /// "compact" or "comfortable".
    #[config(default = "comfortable")]
    pub table_density: TableDensity,

    /// Rows per page for resources that do not set their own size.
    #[config(default = 10, env = "BACKOFFICE_PAGE_SIZE")]
    pub page_size: usize,

    #[config(default = "Yes")]
    pub yes_label: String,

    #[config(default = "No")]
    pub no_label: String,

    /// Placeholder for missing or unreadable values.
    #[config(default = "—")]
    pub empty_placeholder: String,

    /// Cells wider than this are truncated with an ellipsis.
    #[config(default = 32)]
    pub max_cell_width: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            date_format: FALLBACK_DATE_FORMAT.to_string(),
            relative_dates: false,
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            number_decimals: 2,
            thousands_separator: ",".to_string(),
            table_density: TableDensity::Comfortable,
            page_size: 10,
            yes_label: "Yes".to_string(),
            no_label: "No".to_string(),
            empty_placeholder: "—".to_string(),
            max_cell_width: 32,
        }
    }
}

impl DisplaySettings {
    /// Loads settings from the environment and the given directories.
    ///
    /// Missing files are skipped. The project directory wins over the global one.
    pub fn load(project_dir: Option<&Path>, global_dir: Option<&Path>) -> Result<Self> {
        let mut builder = DisplaySettings::builder().env();
        if let Some(dir) = project_dir {
            builder = builder.file(dir.join(SETTINGS_FILENAME));
        }
        if let Some(dir) = global_dir {
            builder = builder.file(dir.join(SETTINGS_FILENAME));
        }
        let settings = builder
            .load()
            .map_err(|e| EngineError::Settings(e.to_string()))?;
        settings.validated()
    }

    /// Rejects values the formatters cannot work with.
    pub fn validated(mut self) -> Result<Self> {
        if self.page_size == 0 {
            return Err(EngineError::Settings(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.max_cell_width < 2 {
            return Err(EngineError::Settings(
                "max_cell_width must be at least 2".to_string(),
            ));
        }
        if !is_valid_strftime(&self.date_format) {
            tracing::warn!(
                format = %self.date_format,
                "invalid date_format, falling back to {}",
                FALLBACK_DATE_FORMAT
            );
            self.date_format = FALLBACK_DATE_FORMAT.to_string();
        }
        Ok(self)
    }

    /// Effective settings as `(key, value)` pairs, in file order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("date_format", self.date_format.clone()),
            ("relative_dates", self.relative_dates.to_string()),
            ("currency_symbol", self.currency_symbol.clone()),
            ("currency_decimals", self.currency_decimals.to_string()),
            ("number_decimals", self.number_decimals.to_string()),
            ("thousands_separator", self.thousands_separator.clone()),
            ("table_density", self.table_density.to_string()),
            ("page_size", self.page_size.to_string()),
            ("yes_label", self.yes_label.clone()),
            ("no_label", self.no_label.clone()),
            ("empty_placeholder", self.empty_placeholder.clone()),
            ("max_cell_width", self.max_cell_width.to_string()),
        ]
    }

    /// A commented TOML file listing every setting with its default.
    pub fn sample_toml() -> String {
        confique::toml::template::<DisplaySettings>(confique::toml::FormatOptions::default())
    }
}

/// chrono panics when formatting with a broken pattern; check it up front.
pub fn is_valid_strftime(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_compiled_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = DisplaySettings::load(Some(dir.path()), None).unwrap();
        let defaults = DisplaySettings::default();
        assert_eq!(loaded.currency_decimals, defaults.currency_decimals);
        assert_eq!(loaded.table_density, defaults.table_density);
        assert_eq!(loaded.max_cell_width, defaults.max_cell_width);
        assert_eq!(loaded.empty_placeholder, defaults.empty_placeholder);
    }

    #[test]
    fn project_file_overrides_global() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(
            project.path().join(SETTINGS_FILENAME),
            "table_density = \"compact\"\n",
        )
        .unwrap();
        fs::write(
            global.path().join(SETTINGS_FILENAME),
            "table_density = \"comfortable\"\nyes_label = \"Y\"\n",
        )
        .unwrap();

        let settings = DisplaySettings::load(Some(project.path()), Some(global.path())).unwrap();
        assert_eq!(settings.table_density, TableDensity::Compact);
        assert_eq!(settings.yes_label, "Y");
    }

    #[test]
    fn broken_file_is_a_settings_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILENAME), "page_size = \"many\"").unwrap();
        let err = DisplaySettings::load(Some(dir.path()), None).unwrap_err();
        assert!(matches!(err, EngineError::Settings(_)));
    }

    #[test]
    fn invalid_date_format_falls_back() {
        let settings = DisplaySettings {
            date_format: "%Y-%Q".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.validated().unwrap().date_format, "%Y-%m-%d");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let settings = DisplaySettings {
            page_size: 0,
            ..Default::default()
        };
        assert!(settings.validated().is_err());
    }

    #[test]
    fn sample_lists_every_key() {
        let sample = DisplaySettings::sample_toml();
        for (key, _) in DisplaySettings::default().entries() {
            assert!(sample.contains(key), "sample is missing {}", key);
        }
    }
}
