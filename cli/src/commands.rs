//! Subcommand handlers.
//!
//! Each handler builds a [`Gallery`] over the configured remote and cache,
//! drives it with intents and prints the result. Handlers return an exit
//! code; unexpected failures bubble up as `anyhow` errors.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use base64::Engine;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use volunteer_directory::{
    CreatePayload, Directory, DirectoryConfig, Gallery, HttpDirectoryClient, Intent, LoadOutcome,
    MemoryRecordStore, Notice, RecordStore,
};

use crate::cli::{AddArgs, Cli, Command, DeleteArgs, GlobalArgs, ListArgs, ShowArgs};
use crate::exit_codes;
use crate::render;
use crate::shell;

/// Largest photo accepted by `add --photo`.
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

/// Load the config file and apply command-line overrides.
pub fn resolve_config(global: &GlobalArgs) -> anyhow::Result<DirectoryConfig> {
    let mut config = match &global.config {
        Some(path) => DirectoryConfig::load_from_path(path)?,
        None => DirectoryConfig::load()?,
    };
    if let Some(url) = &global.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(timeout_ms) = global.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(dir) = &global.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Wire the HTTP client and file cache into a fresh gallery. An unusable
/// cache directory degrades to an in-memory cache for this run.
pub fn open_gallery(config: &DirectoryConfig) -> anyhow::Result<Gallery> {
    let remote = HttpDirectoryClient::new(config).context("failed to build HTTP client")?;
    let store: Arc<dyn RecordStore> = match config.open_cache() {
        Ok(store) => {
            tracing::debug!(cache = %store.path().display(), "opened cache");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Local cache unavailable, changes will not persist: {e}");
            Arc::new(MemoryRecordStore::new())
        }
    };
    let directory = Directory::new(Arc::new(remote), store);
    Ok(Gallery::new(Arc::new(directory)))
}

pub async fn execute(cli: Cli, config: DirectoryConfig) -> anyhow::Result<i32> {
    let json = cli.global.json;
    let mut gallery = open_gallery(&config)?;

    match cli.command {
        Command::List(args) => run_list(&mut gallery, args, json).await,
        Command::Show(args) => run_show(&mut gallery, args, json).await,
        Command::Add(args) => run_add(&mut gallery, args, json).await,
        Command::Delete(args) => run_delete(&mut gallery, args, json).await,
        Command::Categories => run_categories(&mut gallery, json).await,
        Command::Health => run_health(&gallery, &config, json).await,
        Command::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            shell::run_shell(&mut gallery, stdin, &mut stdout).await?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn load(gallery: &mut Gallery) -> anyhow::Result<LoadOutcome> {
    let outcome = gallery
        .load()
        .await
        .context("failed to load volunteers")?;
    Ok(outcome)
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        if notice.is_error() {
            eprintln!("{}", render::render_notice(notice));
        } else {
            println!("{}", render::render_notice(notice));
        }
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_list(gallery: &mut Gallery, args: ListArgs, json: bool) -> anyhow::Result<i32> {
    let outcome = load(gallery).await?;
    gallery
        .dispatch(Intent::SetSearch(args.search.unwrap_or_default()))
        .await;
    gallery.dispatch(Intent::SetCategory(args.category)).await;
    gallery.dispatch(Intent::SetViewMode(args.view)).await;
    let view = gallery.snapshot().await;

    if json {
        print_json(&json!({
            "source": outcome.source_label(),
            "total": view.total,
            "shown": view.records.len(),
            "summary": view.summary,
            "records": view.records,
        }))?;
    } else {
        print!("{}", render::render_view(&view, render::terminal_width()));
        println!();
        println!("{}", render::render_source(&outcome));
    }
    Ok(exit_codes::SUCCESS)
}

async fn run_show(gallery: &mut Gallery, args: ShowArgs, json: bool) -> anyhow::Result<i32> {
    load(gallery).await?;
    let notices = gallery.dispatch(Intent::ViewDetail(args.id)).await;
    let Some(record) = gallery.snapshot().await.selected else {
        print_notices(&notices);
        return Ok(exit_codes::FAILURE);
    };

    if json {
        print_json(&serde_json::to_value(&record)?)?;
    } else {
        print!("{}", render::render_detail(&record));
    }
    Ok(exit_codes::SUCCESS)
}

/// Read a photo and encode it as a `data:` URI.
pub fn photo_data_uri(path: &Path) -> anyhow::Result<String> {
    let mime = mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_().as_str() == "image")
        .with_context(|| format!("{} is not an image file", path.display()))?;
    let size = std::fs::metadata(path)
        .with_context(|| format!("cannot read {}", path.display()))?
        .len();
    if size > MAX_PHOTO_BYTES {
        bail!(
            "{} is {size} bytes; photos must be at most {MAX_PHOTO_BYTES} bytes",
            path.display()
        );
    }
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{mime};base64,{encoded}"))
}

async fn run_add(gallery: &mut Gallery, args: AddArgs, json: bool) -> anyhow::Result<i32> {
    let image = match &args.photo {
        Some(path) => Some(photo_data_uri(path)?),
        None => args.image_url.clone(),
    };
    let payload = CreatePayload {
        name: args.name,
        membership_code: args.code,
        mobile_number: args.mobile,
        address: args.address,
        image,
    };

    load(gallery).await?;
    gallery.dispatch(Intent::RequestAdd).await;
    let notices = gallery.dispatch(Intent::SubmitNew(payload)).await;
    let view = gallery.snapshot().await;

    let record = match view.selected {
        Some(record) if !view.add_form_open => record,
        _ => {
            print_notices(&notices);
            return Ok(exit_codes::FAILURE);
        }
    };

    if json {
        let messages: Vec<&str> = notices.iter().map(Notice::message).collect();
        print_json(&json!({
            "record": record,
            "saved_remotely": !record.is_local_only(),
            "notices": messages,
        }))?;
    } else {
        print_notices(&notices);
        print!("{}", render::render_detail(&record));
    }
    Ok(exit_codes::SUCCESS)
}

/// Ask on stdout, read one answer line from stdin. EOF counts as "no".
async fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

async fn run_delete(gallery: &mut Gallery, args: DeleteArgs, json: bool) -> anyhow::Result<i32> {
    if json && !args.yes {
        bail!("--json requires --yes for delete");
    }

    load(gallery).await?;
    let notices = gallery.dispatch(Intent::RequestDelete(args.id.clone())).await;
    let Some(target) = gallery.snapshot().await.delete_target else {
        print_notices(&notices);
        return Ok(exit_codes::FAILURE);
    };

    if !args.yes && !confirm(&render::render_delete_prompt(&target)).await? {
        gallery.dispatch(Intent::CancelDelete).await;
        println!("Delete cancelled");
        return Ok(exit_codes::SUCCESS);
    }

    let notices = gallery.dispatch(Intent::ConfirmDelete).await;
    if json {
        let remote_confirmed = !notices.iter().any(Notice::is_error);
        print_json(&json!({
            "id": args.id,
            "removed": true,
            "remote_confirmed": remote_confirmed,
        }))?;
    } else {
        print_notices(&notices);
    }
    Ok(exit_codes::SUCCESS)
}

async fn run_categories(gallery: &mut Gallery, json: bool) -> anyhow::Result<i32> {
    load(gallery).await?;
    let categories = gallery.snapshot().await.categories;
    if json {
        print_json(&json!(categories))?;
    } else {
        for code in categories {
            println!("{code}");
        }
    }
    Ok(exit_codes::SUCCESS)
}

async fn run_health(
    gallery: &Gallery,
    config: &DirectoryConfig,
    json: bool,
) -> anyhow::Result<i32> {
    match gallery.directory().health().await {
        Ok(health) => {
            let healthy = health.is_ok();
            if json {
                print_json(&json!({
                    "healthy": healthy,
                    "endpoint": config.api_base_url,
                    "status": health.status,
                    "database": health.database,
                    "timestamp": health.timestamp,
                }))?;
            } else {
                let mark = if healthy { "✓" } else { "✗" };
                println!("{mark} Directory service status: {}", health.status);
                println!("  Endpoint: {}", config.api_base_url);
                if let Some(database) = &health.database {
                    println!("  Database: {database}");
                }
            }
            Ok(if healthy {
                exit_codes::SUCCESS
            } else {
                exit_codes::FAILURE
            })
        }
        Err(e) => {
            if json {
                print_json(&json!({
                    "healthy": false,
                    "endpoint": config.api_base_url,
                    "error": e.to_string(),
                    "category": e.category(),
                }))?;
            } else {
                println!("✗ Directory service unreachable");
                println!("  Endpoint: {}", config.api_base_url);
                println!("  Error: {e}");
            }
            Ok(exit_codes::FAILURE)
        }
    }
}
