//! In-memory blob store, typically loaded from a saved listing snapshot.

use async_trait::async_trait;
use pessbook_core::{BlobEntry, BlobStore, StoreError};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<BlobEntry>,
    keys: HashSet<String>,
    url_base: Option<String>,
}

impl MemoryStore {
    pub fn new(entries: Vec<BlobEntry>, url_base: Option<String>) -> Self {
        let keys = entries.iter().map(|e| e.key.clone()).collect();
        Self {
            entries,
            keys,
            url_base: url_base.map(|b| b.trim_end_matches('/').to_string()),
        }
    }

    /// Load a JSON array of blob entries, as printed by `pessbook list`.
    pub fn load_listing(path: &Path, url_base: Option<String>) -> Result<Self, StoreError> {
        let src = std::fs::read_to_string(path)?;
        let entries: Vec<BlobEntry> = serde_json::from_str(&src)
            .map_err(|e| StoreError::Manifest(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), entries = entries.len(), "loaded listing snapshot");
        Ok(Self::new(entries, url_base))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn list_all(&self, root: &str) -> Result<Vec<BlobEntry>, StoreError> {
        let root = root.trim_matches('/');
        if root.is_empty() {
            return Ok(self.entries.clone());
        }
        let prefix = format!("{root}/");
        Ok(self
            .entries
            .iter()
            .filter(|e| e.key.starts_with(&prefix))
            .cloned()
            .collect())
    }

    /// Without a URL base the key itself is the display reference.
    async fn display_url(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.keys.contains(key) {
            return Ok(None);
        }
        Ok(Some(match &self.url_base {
            Some(base) => format!("{base}/{key}"),
            None => key.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![
                BlobEntry::new("PNG/Momase/Madang/John_Doe.jpg"),
                BlobEntry::new("PNGX/other.jpg"),
                BlobEntry::tagged("PNG/NCD/peter.jpg", "peter-kua"),
            ],
            Some("https://cdn.example/".into()),
        )
    }

    #[tokio::test]
    async fn test_list_filters_on_segment_boundary() {
        let entries = store().list_all("PNG").await.unwrap();
        let keys: Vec<String> = entries.into_iter().map(|e| e.key).collect();
        assert_eq!(keys, ["PNG/Momase/Madang/John_Doe.jpg", "PNG/NCD/peter.jpg"]);
    }

    #[tokio::test]
    async fn test_list_empty_root_returns_everything() {
        assert_eq!(store().list_all("/").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_display_url() {
        let s = store();
        assert_eq!(
            s.display_url("PNG/NCD/peter.jpg").await.unwrap().as_deref(),
            Some("https://cdn.example/PNG/NCD/peter.jpg")
        );
        assert!(s.display_url("PNG/NCD/missing.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_display_url_without_base_is_key() {
        let s = MemoryStore::new(vec![BlobEntry::new("PNG/a.jpg")], None);
        assert_eq!(s.display_url("PNG/a.jpg").await.unwrap().as_deref(), Some("PNG/a.jpg"));
    }

    #[test]
    fn test_load_listing() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"[{"key":"PNG/a.jpg"},{"key":"PNG/b.jpg","externalId":"PNG:b.jpg"}]"#,
        )
        .unwrap();
        let s = MemoryStore::load_listing(tmp.path(), None).unwrap();
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_load_listing_malformed() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not json").unwrap();
        assert!(matches!(
            MemoryStore::load_listing(tmp.path(), None),
            Err(StoreError::Manifest(_))
        ));
    }
}
