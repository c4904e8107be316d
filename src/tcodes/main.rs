use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tcodes::api::CatalogApi;
use tcodes::commands::config::ConfigAction;
use tcodes::error::{EntryError, Result};
use tcodes::init::{self, CatalogContext};
use tcodes::model::{EntryUpdate, NewEntry};
use tcodes::query::{Query, TagFilter};
use tcodes::settings::LaunchText;
use tcodes::store::sqlite::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
mod print;
use args::{Cli, Commands};
use print::{print_counts, print_entries, print_messages, print_settings};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut ctx = init::initialize()?;

    match cli.command {
        Some(Commands::List { search, tag }) => handle_list(&ctx.api, search, &tag),
        Some(Commands::Counts { search }) => handle_counts(&ctx.api, search),
        Some(Commands::Add {
            code,
            title,
            description,
            tags,
        }) => handle_add(&mut ctx.api, code, title, description, tags),
        Some(Commands::Edit {
            code,
            title,
            description,
            tags,
        }) => handle_edit(&mut ctx.api, code, title, description, tags),
        Some(Commands::Delete { code }) => handle_delete(&mut ctx.api, &code),
        Some(Commands::Fav { code }) => handle_fav(&mut ctx.api, &code),
        Some(Commands::Copy { code, alt, print }) => handle_copy(&ctx.api, &code, alt, print),
        Some(Commands::Export { path }) => handle_export(&ctx, path),
        Some(Commands::Import { path }) => handle_import(&mut ctx.api, path),
        Some(Commands::Reset { yes }) => handle_reset(&mut ctx.api, yes),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx.api, key, value),
        Some(Commands::Doctor) => handle_doctor(&mut ctx.api),
        None => handle_list(&ctx.api, None, "ALL"),
    }
}

type Api = CatalogApi<SqliteStore>;

fn handle_list(api: &Api, search: Option<String>, tag: &str) -> Result<()> {
    let filter: TagFilter = tag.parse()?;
    let query = Query::new()
        .with_search(search.unwrap_or_default())
        .with_tag(filter);
    let result = api.list(&query)?;
    print_entries(&result.listed_entries);
    print_messages(&result.messages);
    Ok(())
}

fn handle_counts(api: &Api, search: Option<String>) -> Result<()> {
    let counts = api.tag_counts(search.as_deref().unwrap_or(""))?;
    print_counts(&counts);
    Ok(())
}

fn handle_add(
    api: &mut Api,
    code: String,
    title: String,
    description: String,
    tags: Vec<String>,
) -> Result<()> {
    let entry = NewEntry::new(code, title)
        .with_description(description)
        .with_tags(tags);
    let result = api.add_entry(entry)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(
    api: &mut Api,
    code: String,
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
) -> Result<()> {
    let current = api
        .merged_catalog()?
        .iter()
        .find(|e| e.code == code.trim())
        .cloned();
    let current = current.ok_or_else(|| EntryError::NotFound(code.trim().to_string()))?;

    let mut update = EntryUpdate::new(
        title.unwrap_or(current.title),
        description.unwrap_or(current.description),
    );
    if let Some(tags) = tags {
        update = update.with_tags(tags);
    }

    let result = api.update_entry(&code, update)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(api: &mut Api, code: &str) -> Result<()> {
    let result = api.delete_entry(code)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_fav(api: &mut Api, code: &str) -> Result<()> {
    let favorite = api.toggle_favorite(code)?;
    if favorite {
        println!("★ {} is now a favorite", code.trim());
    } else {
        println!("{} is no longer a favorite", code.trim());
    }
    Ok(())
}

fn handle_copy(api: &Api, code: &str, alternate: bool, print_only: bool) -> Result<()> {
    let launch = api.launch_text(code, alternate)?;
    if print_only {
        println!("{}", launch);
        return Ok(());
    }

    match &launch {
        LaunchText::Url(url) => {
            tcodes::clipboard::open_url(url)?;
            println!("Opened {}", url);
        }
        LaunchText::Text(text) => {
            if let Err(e) = tcodes::clipboard::copy_to_clipboard(text) {
                eprintln!("Warning: Failed to copy to clipboard: {}", e);
            }
            println!("{}", text);
        }
    }
    Ok(())
}

fn handle_export(ctx: &CatalogContext, path: Option<PathBuf>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let result = ctx.api.export_to_file(path.as_deref(), &cwd)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(api: &mut Api, path: PathBuf) -> Result<()> {
    let content = fs::read_to_string(&path)?;
    let result = api.import_snapshot_str(&content)?;
    print_messages(&result.messages);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}

fn handle_reset(api: &mut Api, yes: bool) -> Result<()> {
    if !yes && !confirm("This removes all custom transaction codes and favorites. Continue?")? {
        println!("Operation cancelled.");
        return Ok(());
    }
    let result = api.reset_to_factory_defaults()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(api: &mut Api, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = api.config(action)?;
    if result.messages.is_empty() {
        if let Some(settings) = &result.settings {
            print_settings(settings);
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_doctor(api: &mut Api) -> Result<()> {
    let result = api.doctor()?;
    print_messages(&result.messages);
    Ok(())
}
