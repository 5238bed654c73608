//! Blob store over a local directory tree.
//!
//! Keys are `/`-joined paths relative to the store directory. Tags assigned
//! when a photo was indexed into the face collection live in an optional
//! `tags.toml` manifest at the top of the store:
//!
//! ```toml
//! [tags]
//! "PNG/Momase/Madang/John_Doe.jpg" = "PNG:Momase:Madang:John_Doe.jpg"
//! ```

use async_trait::async_trait;
use pessbook_core::{BlobEntry, BlobStore, StoreError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

pub const TAGS_MANIFEST: &str = "tags.toml";

#[derive(Debug, Default, Deserialize)]
struct TagsManifest {
    #[serde(default)]
    tags: HashMap<String, String>,
}

pub struct DirectoryStore {
    dir: PathBuf,
    /// Public prefix the directory is served under, if any.
    url_base: Option<String>,
    tags: Arc<HashMap<String, String>>,
}

impl DirectoryStore {
    /// Open a store rooted at `dir`, loading `tags.toml` if present.
    pub fn open(dir: impl Into<PathBuf>, url_base: Option<String>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(StoreError::RootNotFound(dir.display().to_string()));
        }

        let manifest_path = dir.join(TAGS_MANIFEST);
        let tags = if manifest_path.is_file() {
            let src = std::fs::read_to_string(&manifest_path)?;
            toml::from_str::<TagsManifest>(&src)
                .map_err(|e| StoreError::Manifest(format!("{}: {e}", manifest_path.display())))?
                .tags
        } else {
            HashMap::new()
        };

        tracing::info!(dir = %dir.display(), tags = tags.len(), "opened directory store");

        Ok(Self {
            dir,
            url_base: url_base.map(|b| b.trim_end_matches('/').to_string()),
            tags: Arc::new(tags),
        })
    }

    /// Filesystem path for `key`, refusing anything that escapes the store.
    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let relative = contained(key)?;
        (!key.is_empty()).then(|| self.dir.join(relative))
    }
}

/// `path` as a store-relative path, or `None` if it could escape the store.
fn contained(path: &str) -> Option<&Path> {
    let relative = Path::new(path.trim_matches('/'));
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then_some(relative)
}

/// `/`-joined key for `path` relative to `base`.
fn key_for(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect();
    Some(parts?.join("/"))
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn walk(
    dir: &Path,
    root: &str,
    tags: &HashMap<String, String>,
) -> Result<Vec<BlobEntry>, StoreError> {
    let Some(relative) = contained(root) else {
        return Err(StoreError::RootNotFound(root.to_string()));
    };
    let root_dir = dir.join(relative);
    if !root_dir.is_dir() {
        return Err(StoreError::RootNotFound(root.to_string()));
    }

    let mut entries = Vec::new();
    let walker = WalkDir::new(&root_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_str().is_some_and(is_hidden));

    for item in walker {
        let item = item.map_err(|e| StoreError::ListingFailed {
            root: root.to_string(),
            reason: e.to_string(),
        })?;
        if !item.file_type().is_file() {
            continue;
        }
        let Some(key) = key_for(dir, item.path()) else {
            tracing::warn!(path = %item.path().display(), "skipping non-UTF-8 path");
            continue;
        };
        if key == TAGS_MANIFEST {
            continue;
        }
        let external_id = tags.get(&key).cloned();
        entries.push(BlobEntry { key, external_id });
    }

    Ok(entries)
}

#[async_trait]
impl BlobStore for DirectoryStore {
    async fn list_all(&self, root: &str) -> Result<Vec<BlobEntry>, StoreError> {
        let dir = self.dir.clone();
        let root_owned = root.to_string();
        let tags = Arc::clone(&self.tags);

        let entries = tokio::task::spawn_blocking(move || walk(&dir, &root_owned, &tags))
            .await
            .map_err(|e| StoreError::ListingFailed {
                root: root.to_string(),
                reason: format!("listing task failed: {e}"),
            })??;

        tracing::debug!(root, count = entries.len(), "listed directory store");
        Ok(entries)
    }

    async fn display_url(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let url = match &self.url_base {
            Some(base) => format!("{base}/{}", key.trim_start_matches('/')),
            None => {
                let absolute = tokio::fs::canonicalize(&path).await?;
                format!("file://{}", absolute.display())
            }
        };
        Ok(Some(url))
    }
}
