use backoffice::engine::SortSpec;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "backoffice",
    bin_name = "backoffice",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Browse and manage records from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the resource files
    #[arg(long, global = true, env = "BACKOFFICE_HOME", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help_heading = "Options")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available resources and their fields
    #[command(display_order = 1)]
    Resources,

    /// Search, filter, sort and page through records
    #[command(alias = "ls", display_order = 2)]
    List(ListArgs),

    /// Show every field of one record
    #[command(alias = "v", display_order = 3)]
    View { resource: String, id: String },

    /// Create a record from KEY=VALUE pairs
    #[command(alias = "n", display_order = 4)]
    Create {
        resource: String,

        /// Field value, e.g. --set name="Ada Lovelace" (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        values: Vec<(String, String)>,
    },

    /// Change fields of a record; an empty value clears an optional field
    #[command(display_order = 5)]
    Update {
        resource: String,
        id: String,

        /// Field value, e.g. --set role=admin (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        values: Vec<(String, String)>,
    },

    /// Delete one or more records
    #[command(alias = "rm", display_order = 6)]
    Delete {
        resource: String,

        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print records as JSON
    #[command(display_order = 7)]
    Export {
        resource: String,

        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Write the demo records for a resource
    #[command(display_order = 8)]
    Seed {
        resource: String,

        /// Replace existing records
        #[arg(long)]
        force: bool,
    },

    /// Show the effective display settings
    #[command(display_order = 9)]
    Config {
        /// Print a commented settings file with every default
        #[arg(long)]
        sample: bool,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    pub resource: String,

    /// Case-insensitive text search over searchable fields
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter, e.g. -f role=admin, -f price=10..100, -f "status=paid|shipped", -f name=~ada (repeatable)
    #[arg(short, long = "filter", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub filters: Vec<(String, String)>,

    /// Sort column, optionally with a direction: --sort price:desc
    #[arg(long, value_name = "KEY[:asc|:desc]", value_parser = parse_sort)]
    pub sort: Option<SortSpec>,

    /// Page to show, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page (defaults to the resource's own size, then the page_size setting)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Print the table view model as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

pub fn parse_sort(raw: &str) -> Result<SortSpec, String> {
    let (key, direction) = match raw.rsplit_once(':') {
        Some((key, direction)) => (key, Some(direction)),
        None => (raw, None),
    };
    if key.trim().is_empty() {
        return Err("sort key is empty".to_string());
    }
    match direction.map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => Ok(SortSpec::asc(key.trim())),
        Some("desc") => Ok(SortSpec::desc(key.trim())),
        Some(other) => Err(format!("unknown sort direction '{}' (use asc or desc)", other)),
    }
}
