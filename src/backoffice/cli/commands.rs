use super::render::Renderer;
use super::setup::{Cli, Commands, ListArgs};
use backoffice::catalog;
use backoffice::config::DisplaySettings;
use backoffice::engine::SortDirection;
use backoffice::error::{EngineError, Result, ValidationErrors};
use backoffice::form::FormInput;
use backoffice::model::{Record, RecordId, Resource};
use backoffice::notice::Notice;
use backoffice::orchestrator::{CrudOrchestrator, IntentOutcome};
use backoffice::present::Intent;
use backoffice::schema::BulkAction;
use backoffice::store::fs::FileResource;
use clap::Parser;
use directories::ProjectDirs;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type Page = CrudOrchestrator<Record, FileResource>;

/// Directory, relative to the working directory, holding project settings.
const PROJECT_DIR: &str = ".backoffice";

struct AppContext {
    data_dir: PathBuf,
    settings: DisplaySettings,
    renderer: Renderer,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = init_context(&cli)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(EngineError::Io)?;

    runtime.block_on(async {
        match cli.command {
            Commands::Resources => handle_resources(&ctx).await,
            Commands::List(args) => handle_list(&ctx, args).await,
            Commands::View { resource, id } => handle_view(&ctx, &resource, id).await,
            Commands::Create { resource, values } => handle_create(&ctx, &resource, values).await,
            Commands::Update {
                resource,
                id,
                values,
            } => handle_update(&ctx, &resource, id, values).await,
            Commands::Delete { resource, ids, yes } => {
                handle_delete(&ctx, &resource, ids, yes).await
            }
            Commands::Export { resource, ids } => handle_export(&ctx, &resource, ids).await,
            Commands::Seed { resource, force } => handle_seed(&ctx, &resource, force).await,
            Commands::Config { sample } => handle_config(&ctx, sample),
        }
    })
}

/// `BACKOFFICE_LOG` wins; otherwise warnings only, or debug with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "backoffice=debug"
    } else {
        "backoffice=warn"
    };
    let filter =
        EnvFilter::try_from_env("BACKOFFICE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let dirs = ProjectDirs::from("com", "backoffice", "backoffice");

    let data_dir = match (&cli.data_dir, &dirs) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dirs)) => dirs.data_dir().to_path_buf(),
        (None, None) => {
            return Err(EngineError::Settings(
                "could not determine a data directory, pass --data-dir".to_string(),
            ))
        }
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let project_dir = cwd.join(PROJECT_DIR);
    let global_dir = dirs.as_ref().map(|d| d.config_dir().to_path_buf());
    let settings = DisplaySettings::load(Some(&project_dir), global_dir.as_deref())?;

    let use_color = !cli.no_color && console::Term::stdout().features().colors_supported();
    debug!(data_dir = %data_dir.display(), use_color, "context ready");

    Ok(AppContext {
        data_dir,
        settings,
        renderer: Renderer::new(use_color),
    })
}

/// A loaded page for one catalog resource.
async fn open_page(ctx: &AppContext, resource: &str) -> Result<Page> {
    let config = catalog::resource(resource)?;
    let backend = FileResource::new(config.clone(), &ctx.data_dir);
    let page = CrudOrchestrator::new(config, backend);
    page.load().await?;
    Ok(page)
}

async fn handle_resources(ctx: &AppContext) -> Result<()> {
    let mut resources = Vec::new();
    for name in catalog::names() {
        let config = catalog::resource(name)?;
        let backend = FileResource::new(config.clone(), &ctx.data_dir);
        let summary = if backend.exists() {
            let page = CrudOrchestrator::<Record, _>::new(config.clone(), backend);
            let count = page.load().await?;
            format!("{} {}", count, if count == 1 { "record" } else { "records" })
        } else {
            "not seeded".to_string()
        };
        resources.push((config, summary));
    }
    print!("{}", ctx.renderer.resources(&resources));
    Ok(())
}

async fn handle_list(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let page = open_page(ctx, &args.resource).await?;
    let config = page.config().clone();

    let mut problems = ValidationErrors::new();
    for (key, _) in &args.filters {
        if !config.is_filterable(key) {
            problems.add(key.clone(), "is not a filterable field");
        }
    }
    if let Some(sort) = &args.sort {
        if !config.is_sortable(&sort.key) {
            problems.add(sort.key.clone(), "is not a sortable field");
        }
    }
    if !problems.is_empty() {
        return Err(EngineError::Validation(problems));
    }

    let mut intents = Vec::new();
    if let Some(term) = args.search {
        intents.push(Intent::SearchChanged(term));
    }
    for (key, raw) in args.filters {
        intents.push(Intent::FilterChanged { key, raw });
    }
    if let Some(sort) = args.sort {
        // a header cycles unsorted → ascending → descending
        let clicks = match sort.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => 2,
        };
        for _ in 0..clicks {
            intents.push(Intent::SortHeaderClicked(sort.key.clone()));
        }
    }
    intents.push(Intent::PageSizeChanged(
        args.page_size
            .unwrap_or_else(|| config.page_size_or(ctx.settings.page_size)),
    ));
    intents.push(Intent::PageChanged(args.page));

    for intent in intents {
        page.handle(intent).await?;
    }

    let view = page.table_view(&ctx.settings);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", ctx.renderer.table(&view, &ctx.settings));
    }
    print_notices(ctx, &page);
    Ok(())
}

async fn handle_view(ctx: &AppContext, resource: &str, id: String) -> Result<()> {
    let page = open_page(ctx, resource).await?;
    let id = RecordId::new(id);
    page.open_view(&id).await?;

    let rows = page.detail_rows(&ctx.settings).unwrap_or_default();
    let title = format!("{} {}", page.config().singular, id);
    print!("{}", ctx.renderer.detail(&title, &rows));
    page.close_view();
    Ok(())
}

async fn handle_create(
    ctx: &AppContext,
    resource: &str,
    values: Vec<(String, String)>,
) -> Result<()> {
    let page = open_page(ctx, resource).await?;
    page.open_create();
    let created = page.submit_create(form_input(values)).await?;
    debug!(id = %created.id(), "created");
    print_notices(ctx, &page);
    Ok(())
}

async fn handle_update(
    ctx: &AppContext,
    resource: &str,
    id: String,
    values: Vec<(String, String)>,
) -> Result<()> {
    if values.is_empty() {
        return Err(EngineError::Validation({
            let mut errors = ValidationErrors::new();
            errors.add("set", "nothing to change, pass at least one --set KEY=VALUE");
            errors
        }));
    }

    let page = open_page(ctx, resource).await?;
    page.open_edit(&RecordId::new(id))?;
    page.submit_edit(form_input(values)).await?;
    print_notices(ctx, &page);
    Ok(())
}

async fn handle_delete(ctx: &AppContext, resource: &str, ids: Vec<String>, yes: bool) -> Result<()> {
    let page = open_page(ctx, resource).await?;
    let ids: Vec<RecordId> = ids.into_iter().map(RecordId::new).collect();
    let pending = match ids.as_slice() {
        [only] => page.request_delete(only)?,
        many => page.request_delete_many(many)?,
    };

    if !yes && !ask(pending.prompt())? {
        print_message(ctx, Notice::info("Nothing deleted."));
        return Ok(());
    }

    page.confirm(pending).await?;
    print_notices(ctx, &page);
    Ok(())
}

async fn handle_export(ctx: &AppContext, resource: &str, ids: Vec<String>) -> Result<()> {
    let page = open_page(ctx, resource).await?;
    let ids: BTreeSet<RecordId> = ids.into_iter().map(RecordId::new).collect();
    // one page holding every record, so any id can be selected
    page.handle(Intent::PageSizeChanged(page.records().len().max(1)))
        .await?;
    for id in ids {
        if page.record(&id).is_none() {
            return Err(EngineError::NotFound(format!("{} {}", page.config().singular, id)));
        }
        page.handle(Intent::SelectToggled(id)).await?;
    }

    match page.handle(Intent::BulkAction(BulkAction::Export)).await? {
        IntentOutcome::Exported(json) => println!("{}", json),
        other => debug!(?other, "export produced no output"),
    }
    // stdout carries the JSON; the notice goes to stderr
    for notice in page.take_notices() {
        eprint!("{}", ctx.renderer.messages(&[notice]));
    }
    Ok(())
}

async fn handle_seed(ctx: &AppContext, resource: &str, force: bool) -> Result<()> {
    let config = catalog::resource(resource)?;
    let records = catalog::seed(resource)?;
    let backend = FileResource::new(config.clone(), &ctx.data_dir);

    if backend.exists() && !force {
        let page = CrudOrchestrator::<Record, _>::new(config.clone(), backend);
        let existing = page.load().await?;
        if existing > 0 {
            return Err(EngineError::Conflict(format!(
                "{} already has {} records, pass --force to replace them",
                config.name, existing
            )));
        }
        page.backend().replace_all(&records).await?;
    } else {
        backend.replace_all(&records).await?;
    }

    print_message(
        ctx,
        Notice::success(format!("Seeded {} {}", records.len(), config.name)),
    );
    Ok(())
}

fn handle_config(ctx: &AppContext, sample: bool) -> Result<()> {
    if sample {
        print!("{}", DisplaySettings::sample_toml());
    } else {
        print!("{}", ctx.renderer.settings(&ctx.settings.entries()));
    }
    Ok(())
}

fn form_input(values: Vec<(String, String)>) -> FormInput {
    values.into_iter().collect()
}

/// Prompts on stdout and reads a yes/no answer; anything but "y"/"yes" is no.
fn ask(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn print_notices(ctx: &AppContext, page: &Page) {
    print!("{}", ctx.renderer.messages(&page.take_notices()));
}

fn print_message(ctx: &AppContext, notice: Notice) {
    print!("{}", ctx.renderer.messages(&[notice]));
}
