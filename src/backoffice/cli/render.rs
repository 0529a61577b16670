//! # Rendering Module
//!
//! Turns the library's view models into terminal text.
//!
//! Layout calculations (column widths, alignment, padding) stay in Rust because
//! they need Unicode-aware width handling. Templates receive pre-laid-out
//! strings plus a style name per piece and only decide what gets printed. The
//! `style` filter applies [`BACKOFFICE_THEME`] when color is on and passes
//! text through untouched otherwise.

use super::styles::{cell_style, names, notice_style, BACKOFFICE_THEME};
use super::templates::{
    DETAIL_TEMPLATE, LIST_TEMPLATE, MESSAGES_TEMPLATE, RESOURCES_TEMPLATE, SETTINGS_TEMPLATE,
};
use backoffice::config::DisplaySettings;
use backoffice::notice::Notice;
use backoffice::present::{DetailRow, PageLink, TableView};
use backoffice::schema::ResourceConfig;
use minijinja::{Environment, Error, Value};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// Renders templates with the backoffice theme.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    use_color: bool,
}

impl Renderer {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn render<T: Serialize>(&self, template: &str, data: &T) -> String {
        self.try_render(template, data)
            .unwrap_or_else(|e| format!("Render error: {}\n", e))
    }

    fn try_render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, Error> {
        let mut env = Environment::new();
        let use_color = self.use_color;
        env.add_filter("style", move |value: Value, name: String| -> String {
            BACKOFFICE_THEME.apply(&name, &value.to_string(), use_color)
        });
        env.add_template_owned("_inline".to_string(), template.to_string())?;
        env.get_template("_inline")?.render(data)
    }

    pub fn table<Id>(&self, view: &TableView<Id>, settings: &DisplaySettings) -> String {
        self.render(LIST_TEMPLATE, &ListData::from_view(view, settings))
    }

    pub fn detail(&self, title: &str, rows: &[DetailRow]) -> String {
        self.render(DETAIL_TEMPLATE, &DetailData::new(title, rows))
    }

    pub fn messages(&self, notices: &[Notice]) -> String {
        let messages: Vec<MessageData> = notices
            .iter()
            .map(|notice| MessageData {
                text: notice.text.clone(),
                style: notice_style(notice.level),
            })
            .collect();
        self.render(MESSAGES_TEMPLATE, &minijinja::context! { messages })
    }

    /// `resources` pairs each config with a short summary, e.g. "12 records".
    pub fn resources(&self, resources: &[(ResourceConfig, String)]) -> String {
        let resources: Vec<ResourceData> = resources
            .iter()
            .map(|(config, summary)| ResourceData::new(config, summary))
            .collect();
        self.render(RESOURCES_TEMPLATE, &minijinja::context! { resources })
    }

    pub fn settings(&self, entries: &[(&'static str, String)]) -> String {
        let width = entries.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
        let entries: Vec<SettingData> = entries
            .iter()
            .map(|(key, value)| SettingData {
                key: *key,
                padding: " ".repeat(width - key.width()),
                value: value.clone(),
            })
            .collect();
        self.render(SETTINGS_TEMPLATE, &minijinja::context! { entries })
    }
}

#[derive(Serialize)]
struct CellData {
    text: String,
    style: &'static str,
}

#[derive(Serialize)]
struct RowData {
    cells: Vec<CellData>,
}

#[derive(Serialize)]
struct FilterData {
    label: String,
    value: String,
}

/// Pre-laid-out list page: every cell is already padded to its column width.
#[derive(Serialize)]
struct ListData {
    search: Option<String>,
    filters: Vec<FilterData>,
    header: Vec<CellData>,
    rows: Vec<RowData>,
    gap: String,
    summary: String,
    pages: String,
    empty_message: Option<String>,
}

impl ListData {
    fn from_view<Id>(view: &TableView<Id>, settings: &DisplaySettings) -> Self {
        let header_texts: Vec<String> = view
            .headers
            .iter()
            .map(|h| {
                if h.indicator.is_empty() {
                    h.label.clone()
                } else {
                    format!("{} {}", h.label, h.indicator)
                }
            })
            .collect();

        let widths: Vec<usize> = header_texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                view.rows
                    .iter()
                    .filter_map(|row| row.cells.get(i))
                    .map(|cell| cell.text.width())
                    .chain(std::iter::once(text.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let last = widths.len().saturating_sub(1);

        let header = view
            .headers
            .iter()
            .zip(&header_texts)
            .enumerate()
            .map(|(i, (h, text))| CellData {
                text: pad(text, widths[i], h.numeric, i == last),
                style: if h.sort.is_some() {
                    names::HEADER_SORTED
                } else {
                    names::HEADER
                },
            })
            .collect();

        let rows = view
            .rows
            .iter()
            .map(|row| RowData {
                cells: row
                    .cells
                    .iter()
                    .zip(&widths)
                    .enumerate()
                    .map(|(i, (cell, width))| CellData {
                        text: pad(&cell.text, *width, cell.style.right_aligned(), i == last),
                        style: cell_style(cell.style),
                    })
                    .collect(),
            })
            .collect();

        let filters = view
            .filters
            .iter()
            .filter_map(|f| {
                f.value.as_ref().map(|value| FilterData {
                    label: f.label.clone(),
                    value: value.clone(),
                })
            })
            .collect();

        let (summary, pages) = match &view.controls {
            Some(controls) => {
                let pages = if controls.total_pages > 1 {
                    page_line(&controls.links)
                } else {
                    String::new()
                };
                (controls.summary(), pages)
            }
            None => (format!("{} {}", view.total_count, view.resource), String::new()),
        };

        Self {
            search: view.search.clone().filter(|s| !s.trim().is_empty()),
            filters,
            header,
            rows,
            gap: " ".repeat(settings.table_density.column_gap()),
            summary,
            pages,
            empty_message: view.empty_message.clone(),
        }
    }
}

/// Pads `text` to `width`. The last left-aligned column gets no trailing spaces.
fn pad(text: &str, width: usize, right: bool, last: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    if right {
        format!("{}{}", fill, text)
    } else if last {
        text.to_string()
    } else {
        format!("{}{}", text, fill)
    }
}

/// `Page 1 2 [3] 4 … 9`
fn page_line(links: &[PageLink]) -> String {
    let parts: Vec<String> = links
        .iter()
        .map(|link| match link {
            PageLink::Page {
                number,
                current: true,
            } => format!("[{}]", number),
            PageLink::Page { number, .. } => number.to_string(),
            PageLink::Gap => "…".to_string(),
        })
        .collect();
    format!("Page {}", parts.join(" "))
}

#[derive(Serialize)]
struct DetailRowData {
    label: String,
    padding: String,
    value: String,
    style: &'static str,
}

#[derive(Serialize)]
struct DetailData {
    title: String,
    rows: Vec<DetailRowData>,
}

impl DetailData {
    fn new(title: &str, rows: &[DetailRow]) -> Self {
        let width = rows.iter().map(|r| r.label.width()).max().unwrap_or(0);
        Self {
            title: title.to_string(),
            rows: rows
                .iter()
                .map(|row| DetailRowData {
                    label: row.label.clone(),
                    padding: " ".repeat(width - row.label.width()),
                    value: row.value.text.clone(),
                    style: cell_style(row.value.style),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct MessageData {
    text: String,
    style: &'static str,
}

#[derive(Serialize)]
struct FieldData {
    key: String,
    padding: String,
    kind: &'static str,
    flags: String,
}

#[derive(Serialize)]
struct ResourceData {
    name: String,
    summary: String,
    fields: Vec<FieldData>,
}

impl ResourceData {
    fn new(config: &ResourceConfig, summary: &str) -> Self {
        let width = config.fields.iter().map(|f| f.key.width()).max().unwrap_or(0);
        let fields = config
            .fields
            .iter()
            .map(|field| {
                let flags: Vec<&str> = [
                    (field.required, "required"),
                    (field.searchable, "search"),
                    (field.sortable, "sort"),
                    (field.filterable, "filter"),
                    (!field.in_table, "hidden in table"),
                ]
                .into_iter()
                .filter(|(on, _)| *on)
                .map(|(_, flag)| flag)
                .collect();
                FieldData {
                    key: field.key.clone(),
                    padding: " ".repeat(width - field.key.width()),
                    kind: field.kind.as_str(),
                    flags: flags.join(", "),
                }
            })
            .collect();
        Self {
            name: config.name.clone(),
            summary: summary.to_string(),
            fields,
        }
    }
}

#[derive(Serialize)]
struct SettingData {
    key: &'static str,
    padding: String,
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice::engine::{Action, ViewState};
    use backoffice::fields::{FieldSpec, ValueKind};
    use backoffice::model::{Record, RecordId};
    use backoffice::present::build_table;

    fn config() -> ResourceConfig {
        ResourceConfig::builder("items")
            .singular("item")
            .field(FieldSpec::new("id", "ID", ValueKind::String).sortable())
            .field(
                FieldSpec::new("name", "Name", ValueKind::String)
                    .searchable()
                    .sortable(),
            )
            .field(FieldSpec::new("qty", "Qty", ValueKind::Number).sortable())
            .page_size(2)
            .build()
            .unwrap()
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new("1").with("name", "Bolt").with("qty", 1200.0),
            Record::new("2").with("name", "Nut").with("qty", 7.0),
            Record::new("3").with("name", "Washer").with("qty", 30.0),
        ]
    }

    fn view(actions: Vec<Action<RecordId>>) -> TableView<RecordId> {
        let config = config();
        let records = records();
        let mut state = ViewState::new(&config);
        for action in actions {
            state = state.reduce(action, &records, &config);
        }
        build_table(&records, &state, &config, &DisplaySettings::default())
    }

    #[test]
    fn table_aligns_columns() {
        let out = Renderer::new(false).table(&view(vec![]), &DisplaySettings::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID   Name     Qty");
        assert_eq!(lines[1], "1    Bolt   1,200");
        assert_eq!(lines[2], "2    Nut        7");
        assert_eq!(lines[3], "Showing 1–2 of 3   Page [1] 2");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn sorted_header_carries_indicator() {
        let out = Renderer::new(false).table(
            &view(vec![Action::SortHeaderClick("name".into())]),
            &DisplaySettings::default(),
        );
        assert!(out.starts_with("ID   Name ▲"), "{}", out);
    }

    #[test]
    fn search_line_and_empty_message() {
        let out = Renderer::new(false).table(
            &view(vec![Action::SetSearch("zzz".into())]),
            &DisplaySettings::default(),
        );
        assert_eq!(
            out,
            "Search: zzz\nNo items match the current search and filters.\n"
        );
    }

    #[test]
    fn detail_pads_labels() {
        let config = config();
        let rows = backoffice::present::build_detail(
            &records()[0],
            &config,
            &DisplaySettings::default(),
        );
        let out = Renderer::new(false).detail("item 1", &rows);
        assert_eq!(out, "item 1\nID    1\nName  Bolt\nQty   1,200\n");
    }

    #[test]
    fn messages_one_per_line() {
        let out = Renderer::new(false).messages(&[
            Notice::success("Created item 4"),
            Notice::warning("item 9 no longer exists"),
        ]);
        assert_eq!(out, "Created item 4\nitem 9 no longer exists\n");
    }

    #[test]
    fn settings_align_on_equals() {
        let out = Renderer::new(false).settings(&[
            ("page_size", "10".to_string()),
            ("yes_label", "Yes".to_string()),
            ("relative_dates", "false".to_string()),
        ]);
        assert_eq!(
            out,
            "page_size      = 10\nyes_label      = Yes\nrelative_dates = false\n"
        );
    }

    #[test]
    fn resources_list_fields_with_flags() {
        let out = Renderer::new(false).resources(&[(config(), "3 records".to_string())]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "items (3 records)");
        assert_eq!(lines[1], "  id    string  sort");
        assert_eq!(lines[2], "  name  string  search, sort");
        assert_eq!(lines[3], "  qty   number  sort");
    }
}
