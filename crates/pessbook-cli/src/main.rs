use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pessbook_core::{BlobStore, EnrichedMatch, FaceMatchCandidate, FaceSearch, Resolver};
use pessbook_store::{CollectionMap, DirectoryStore, MemoryStore, RecordedSearch};
use serde::Serialize;
use std::path::{Path, PathBuf};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "pessbook", about = "PNG Pess Book face-match resolution CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve saved face-search matches to stored photos
    Resolve {
        /// JSON array of candidates as returned by the provider
        #[arg(short, long)]
        matches: PathBuf,
        /// Store root the matches were searched under (e.g., "PNG")
        #[arg(short, long)]
        root: String,
        /// Resolve against a saved listing instead of the store directory
        #[arg(long)]
        listing: Option<PathBuf>,
    },
    /// Search a collection by image using recorded provider responses
    Search {
        /// Query image file
        #[arg(short, long)]
        image: PathBuf,
        /// Face collection id
        #[arg(short, long)]
        collection: String,
        /// Recorded provider responses (JSON object keyed by collection)
        #[arg(long)]
        recorded: PathBuf,
        /// Override PESSBOOK_MAX_CANDIDATES
        #[arg(long)]
        max_candidates: Option<usize>,
        /// Override PESSBOOK_SIMILARITY_THRESHOLD
        #[arg(long)]
        threshold: Option<f32>,
        /// Resolve against a saved listing instead of the store directory
        #[arg(long)]
        listing: Option<PathBuf>,
    },
    /// List stored photos under a root
    List {
        /// Store root (empty for the whole store)
        #[arg(short, long, default_value = "")]
        root: String,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries JSON output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Resolve {
            matches,
            root,
            listing,
        } => {
            let candidates = read_candidates(&matches)?;
            let enriched = resolve(&config, listing.as_deref(), &candidates, &root).await?;
            print_json(&enriched)?;
        }
        Commands::Search {
            image,
            collection,
            recorded,
            max_candidates,
            threshold,
            listing,
        } => {
            let image_bytes = std::fs::read(&image)
                .with_context(|| format!("failed to read image {}", image.display()))?;
            let provider = RecordedSearch::load(&recorded)?;

            let collections = match &config.collections_path {
                Some(path) => CollectionMap::load(path)?,
                None => CollectionMap::default(),
            };
            let root = collections.root_for(&collection);

            let candidates = provider
                .search_by_image(
                    &image_bytes,
                    &collection,
                    max_candidates.unwrap_or(config.max_candidates),
                    threshold.unwrap_or(config.similarity_threshold),
                )
                .await
                .with_context(|| format!("face search in collection {collection} failed"))?;
            tracing::info!(
                collection = %collection,
                root,
                candidates = candidates.len(),
                "face search complete"
            );

            let enriched = resolve(&config, listing.as_deref(), &candidates, root).await?;
            print_json(&enriched)?;
        }
        Commands::List { root } => {
            let store = DirectoryStore::open(&config.store_dir, config.url_base.clone())?;
            let entries = store
                .list_all(&root)
                .await
                .with_context(|| format!("failed to list {root:?}"))?;
            print_json(&entries)?;
        }
        Commands::Config => {
            print_json(&config)?;
        }
    }

    Ok(())
}

fn read_candidates(path: &Path) -> Result<Vec<FaceMatchCandidate>> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read matches {}", path.display()))?;
    serde_json::from_str(&src).with_context(|| format!("malformed matches in {}", path.display()))
}

/// Resolve against a listing snapshot when given one, otherwise the store directory.
async fn resolve(
    config: &Config,
    listing: Option<&Path>,
    candidates: &[FaceMatchCandidate],
    root: &str,
) -> Result<Vec<EnrichedMatch>> {
    match listing {
        Some(path) => {
            let store = MemoryStore::load_listing(path, config.url_base.clone())?;
            resolve_with(store, config, candidates, root).await
        }
        None => {
            let store = DirectoryStore::open(&config.store_dir, config.url_base.clone())?;
            resolve_with(store, config, candidates, root).await
        }
    }
}

async fn resolve_with<S: BlobStore>(
    store: S,
    config: &Config,
    candidates: &[FaceMatchCandidate],
    root: &str,
) -> Result<Vec<EnrichedMatch>> {
    let resolver = Resolver::new(store, config.resolver_options());
    Ok(resolver.resolve_for_root(candidates, root).await?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
