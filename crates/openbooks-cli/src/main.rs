mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use openbooks_bot::Bot;
use openbooks_core::{
    AppConfig, BookRecord, CatalogCollection, Database, FeaturedBooks, OpenbooksError,
    import_collection,
};
use openbooks_server::AppState;
use openbooks_sources::{Aggregator, SourcesConfig};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "openbooks",
    about = "Public-domain book search across Anna's Archive, Gutenberg, Open Library and the Internet Archive",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format.
    /// Also enabled by setting OPENBOOKS_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve {
        /// Also run the Telegram bot in the same process.
        #[arg(long)]
        with_bot: bool,
    },

    /// Search every enabled provider.
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Do not write results to the cache.
        #[arg(long)]
        no_cache: bool,
    },

    /// Run the Telegram bot.
    Bot,

    /// Show a cached book by ID.
    Book { id: String },

    /// List browseable categories.
    Categories,

    /// Import a featured collection from a book catalog CSV.
    ImportCsv {
        path: PathBuf,
        /// `featured` or `fantasy`.
        #[arg(long)]
        collection: CatalogCollection,
    },

    /// Write the imported collections to the featured JSON file.
    ExportFeatured {
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration.
    Config,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let start = Instant::now();
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("OPENBOOKS_JSON").as_deref() == Ok("1");

    let config = AppConfig::load()
        .with_context(|| format!("load config from {}", AppConfig::config_path().display()))?;

    match cli.command {
        Commands::Serve { with_bot } => {
            let aggregator = Arc::new(build_aggregator(&config)?);
            let db = Arc::new(open_db(&config)?);

            if with_bot {
                let bot = Bot::from_env(Arc::clone(&aggregator), &config.bot)
                    .context("start telegram bot")?;
                tokio::spawn(async move { bot.run().await });
            }

            let state = AppState::new(aggregator, db, &config);
            openbooks_server::serve(state, &config).await?;
        }

        Commands::Bot => {
            let aggregator = Arc::new(build_aggregator(&config)?);
            let bot = Bot::from_env(aggregator, &config.bot).context("start telegram bot")?;
            bot.run().await;
        }

        Commands::Search { query, limit, no_cache } => {
            let limit = limit.unwrap_or(config.search.default_limit);
            let aggregator = build_aggregator(&config)?;
            let books = aggregator.search(&query, limit).await;

            if !no_cache && !books.is_empty() {
                let db = open_db(&config)?;
                if let Err(err) = db.upsert_books(&books) {
                    warn!(error = %err, "failed to cache search results");
                }
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": { "items": books, "total": books.len(), "query": query },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if books.is_empty() {
                println!("No results for: {query}");
            } else {
                println!("Found {} results:", books.len());
                for book in &books {
                    print_book_line(book);
                }
            }
        }

        Commands::Book { id } => {
            let db = open_db(&config)?;
            let dur = start.elapsed().as_millis();
            match db.get_cached_book(&id) {
                Ok(cached) => {
                    if json_output {
                        print_json(&json!({"status": "ok", "data": cached, "meta": {"duration_ms": dur}}))?;
                    } else {
                        println!("{}", serde_json::to_string_pretty(&cached)?);
                    }
                }
                Err(OpenbooksError::BookNotFound(_)) => {
                    if json_output {
                        print_json(&json!({
                            "status": "error",
                            "error": "not_found",
                            "message": format!("Book {id} not found in cache"),
                            "meta": {"duration_ms": dur}
                        }))?;
                    } else {
                        eprintln!("Book not found in cache: {id}");
                    }
                    std::process::exit(2);
                }
                Err(err) => return Err(err).context("read book from cache"),
            }
        }

        Commands::Categories => {
            let db = open_db(&config)?;
            let categories = db.list_categories()?;
            if json_output {
                print_json(&json!({"status": "ok", "data": {"categorias": categories}}))?;
            } else {
                for category in &categories {
                    let marker = if category.adult { " (18+)" } else { "" };
                    println!("{:<4} {}{marker}", category.id, category.name);
                }
            }
        }

        Commands::ImportCsv { path, collection } => {
            let db = open_db(&config)?;
            let report = import_collection(&db, &path, collection)
                .with_context(|| format!("import {}", path.display()))?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": {
                        "collection": collection.source(),
                        "imported": report.books.len(),
                        "rows_scanned": report.rows_scanned,
                        "rows_malformed": report.rows_malformed,
                    },
                    "meta": {"duration_ms": dur}
                }))?;
            } else if report.books.is_empty() {
                println!(
                    "No qualifying rows in {} ({} scanned); collection left unchanged.",
                    path.display(),
                    report.rows_scanned
                );
            } else {
                println!(
                    "Imported {} books into {} ({} rows scanned, {} malformed).",
                    report.books.len(),
                    collection.source(),
                    report.rows_scanned,
                    report.rows_malformed
                );
            }
        }

        Commands::ExportFeatured { output } => {
            let db = open_db(&config)?;
            let featured = FeaturedBooks::from_database(&db)?;
            let path = output.unwrap_or_else(|| config.featured_path());
            featured
                .save(&path)
                .with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "featured collections exported");

            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": {
                        "path": path.display().to_string(),
                        "destaques": featured.featured.len(),
                        "fantasy": featured.fantasy.len(),
                    }
                }))?;
            } else {
                println!(
                    "Wrote {} featured and {} fantasy books to {}",
                    featured.featured.len(),
                    featured.fantasy.len(),
                    path.display()
                );
            }
        }

        Commands::Config => {
            if json_output {
                print_json(&json!({
                    "status": "ok",
                    "data": {
                        "config_path": AppConfig::config_path().display().to_string(),
                        "database_path": config.database_path().display().to_string(),
                        "featured_path": config.featured_path().display().to_string(),
                        "config": config,
                    }
                }))?;
            } else {
                println!("# {}", AppConfig::config_path().display());
                println!("# database: {}", config.database_path().display());
                println!("# featured: {}", config.featured_path().display());
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn print_book_line(book: &BookRecord) {
    println!("  {:<24}  {:<40}  {:<25}  {}", book.id, book.title, book.author, book.source);
    if let Some(link) = book.best_link() {
        println!("  {:<24}  {link}", "");
    }
}

fn build_aggregator(config: &AppConfig) -> Result<Aggregator> {
    let sources = SourcesConfig::from_app_config(config);
    let aggregator = Aggregator::from_config(&sources).context("build provider clients")?;
    info!(providers = ?aggregator.provider_names(), "providers enabled");
    Ok(aggregator)
}

fn open_db(config: &AppConfig) -> Result<Database> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create data dir {}", parent.display()))?;
    }
    Database::open(&db_path).with_context(|| format!("open cache at {}", db_path.display()))
}
