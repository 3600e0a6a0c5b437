#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voicelib::catalog::{Catalog, CatalogFilter};
use voicelib::config::Config;
use voicelib::models::{
    ArchiveExtractor, ConsoleProgress, HttpFetcher, ModelLibrary, RemoteModelFetcher,
    UploadIngester,
};

#[derive(Parser)]
#[command(name = "voicelib")]
#[command(about = "Manage local voice models", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/voicelib/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed models
    List {
        /// Show payload, index and size for each model
        #[arg(long)]
        details: bool,
    },
    /// Download a zipped model and install it
    Download {
        /// Download link (pixeldrain share links are resolved automatically)
        url: String,
        /// Name of the new model directory
        name: String,
    },
    /// Install a local .pth file, a .zip archive, or a .pth + .index pair
    Upload {
        files: Vec<PathBuf>,
        /// Name of the new model directory
        #[arg(long)]
        name: String,
    },
    /// Delete installed models
    Delete { names: Vec<String> },
    /// Delete every installed model
    DeleteAll,
    /// Browse the public model catalog
    Catalog {
        /// Only show models carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Case-insensitive text search
        #[arg(long, default_value = "")]
        query: String,
    },
    /// List catalog tags
    Tags,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let root = config.models.models_root()?;
    let heuristic = config.models.heuristic();
    tracing::debug!("Using models root {}", root.path().display());

    match cli.command {
        Commands::List { details } => {
            let library = ModelLibrary::new(root, heuristic);
            for name in library.list_installed()? {
                if details {
                    let model = library.inspect(&name)?;
                    println!(
                        "{name}\t{}\t{}\t{} MB",
                        model.payload.as_deref().unwrap_or("-"),
                        model.index.as_deref().unwrap_or("-"),
                        model.size_bytes / 1_000_000
                    );
                } else {
                    println!("{name}");
                }
            }
        }
        Commands::Download { url, name } => {
            let fetcher = HttpFetcher::new(&config.download)?;
            let remote = RemoteModelFetcher::new(
                root,
                fetcher,
                config.download.staging_dir(),
                ArchiveExtractor::new(heuristic),
            );
            let progress = ConsoleProgress::new();
            let result = remote.fetch_from_url(&url, &name, &progress).await;
            progress.finish();
            println!("{}", result?);
        }
        Commands::Upload { files, name } => {
            let ingester = UploadIngester::new(root, heuristic);
            let progress = ConsoleProgress::new();
            let result = ingester.ingest(&files, &name, &progress);
            progress.finish();
            println!("{}", result?);
        }
        Commands::Delete { names } => {
            let library = ModelLibrary::new(root, heuristic);
            let progress = ConsoleProgress::new();
            let result = library.delete(&names, &progress);
            progress.finish();
            println!("{}", result?);
        }
        Commands::DeleteAll => {
            let library = ModelLibrary::new(root, heuristic);
            let progress = ConsoleProgress::new();
            let result = library.delete_all(&progress);
            progress.finish();
            println!("{}", result?);
        }
        Commands::Catalog { tags, query } => {
            let catalog = load_catalog(&config)?;
            let (rows, _) = CatalogFilter::new(&catalog).filter_table(&tags, &query);
            for (name, description, tags, credit, added, url) in rows {
                println!(
                    "{name}\t{description}\t[{}]\t{credit}\t{added}\t{url}",
                    tags.join(", ")
                );
            }
        }
        Commands::Tags => {
            let catalog = load_catalog(&config)?;
            for tag in CatalogFilter::new(&catalog).list_tags() {
                match catalog.tag_description(tag) {
                    Some(description) if !description.is_empty() => {
                        println!("{tag}\t{description}");
                    }
                    _ => println!("{tag}"),
                }
            }
        }
    }

    Ok(())
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    let path = config.catalog_path()?;
    Catalog::load(&path).with_context(|| format!("Could not open catalog {}", path.display()))
}
