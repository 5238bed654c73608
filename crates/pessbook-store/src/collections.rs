//! Collection id to blob-store root mapping.
//!
//! Each face collection corresponds to one root folder of the blob store.
//! The map is read from a TOML file:
//!
//! ```toml
//! [collections]
//! png-faces = "PNG"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionMapError {
    #[error("failed to read collection map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bad collection map TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionMap {
    #[serde(default)]
    collections: HashMap<String, String>,
}

impl CollectionMap {
    pub fn from_toml_str(src: &str) -> Result<Self, CollectionMapError> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: &Path) -> Result<Self, CollectionMapError> {
        let src = std::fs::read_to_string(path).map_err(|source| CollectionMapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let map = Self::from_toml_str(&src)?;
        tracing::info!(
            path = %path.display(),
            collections = map.collections.len(),
            "loaded collection map"
        );
        Ok(map)
    }

    /// Root folder for `collection_id`. An unmapped collection is its own root.
    pub fn root_for<'a>(&'a self, collection_id: &'a str) -> &'a str {
        self.collections
            .get(collection_id)
            .map(String::as_str)
            .unwrap_or(collection_id)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_collection() {
        let map = CollectionMap::from_toml_str("[collections]\npng-faces = \"PNG\"\n").unwrap();
        assert_eq!(map.root_for("png-faces"), "PNG");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_unmapped_collection_is_its_own_root() {
        let map = CollectionMap::default();
        assert_eq!(map.root_for("PNG"), "PNG");
    }

    #[test]
    fn test_empty_file_is_empty_map() {
        assert!(CollectionMap::from_toml_str("").unwrap().is_empty());
    }

    #[test]
    fn test_bad_toml() {
        let err = CollectionMap::from_toml_str("[collections]\npng-faces = 3\n").unwrap_err();
        assert!(matches!(err, CollectionMapError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CollectionMap::load(Path::new("/nonexistent/collections.toml")).unwrap_err();
        assert!(matches!(err, CollectionMapError::Io { .. }));
    }
}
