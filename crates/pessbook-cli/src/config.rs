use pessbook_core::resolver::{DEFAULT_PLACEHOLDER_IMAGE, DEFAULT_URL_CONCURRENCY};
use pessbook_core::ResolverOptions;
use serde::Serialize;
use std::path::PathBuf;

/// CLI configuration, loaded from environment variables.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the photo tree (default: $XDG_DATA_HOME/pessbook/blobs).
    pub store_dir: PathBuf,
    /// Public URL prefix the store directory is served under.
    pub url_base: Option<String>,
    /// Image shown for unresolved matches.
    pub placeholder_image: String,
    /// Concurrent display-URL lookups per search.
    pub url_concurrency: usize,
    /// Maximum candidates requested from the face-search provider.
    pub max_candidates: usize,
    /// Minimum provider similarity (0-100) for a candidate to be returned.
    pub similarity_threshold: f32,
    /// TOML file mapping collection ids to store roots.
    pub collections_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `PESSBOOK_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let store_dir = var("PESSBOOK_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let data_dir = var("XDG_DATA_HOME").map(PathBuf::from).unwrap_or_else(|| {
                    let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                    PathBuf::from(home).join(".local/share")
                });
                data_dir.join("pessbook").join("blobs")
            });

        Self {
            store_dir,
            url_base: var("PESSBOOK_URL_BASE").filter(|v| !v.is_empty()),
            placeholder_image: var("PESSBOOK_PLACEHOLDER_IMAGE")
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER_IMAGE.to_string()),
            url_concurrency: parsed(&var, "PESSBOOK_URL_CONCURRENCY", DEFAULT_URL_CONCURRENCY),
            max_candidates: parsed(&var, "PESSBOOK_MAX_CANDIDATES", 10),
            similarity_threshold: parsed(&var, "PESSBOOK_SIMILARITY_THRESHOLD", 80.0),
            collections_path: var("PESSBOOK_COLLECTIONS").map(PathBuf::from),
        }
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            placeholder_image: self.placeholder_image.clone(),
            url_concurrency: self.url_concurrency,
        }
    }
}

fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
