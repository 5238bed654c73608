//! Collaborator seams: the blob store and the face-search provider.

use crate::types::{BlobEntry, FaceMatchCandidate};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("root not found: {0}")]
    RootNotFound(String),
    #[error("listing failed under {root}: {reason}")]
    ListingFailed { root: String, reason: String },
    #[error("malformed manifest: {0}")]
    Manifest(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("empty image")]
    EmptyImage,
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Hierarchical blob storage holding the registered photos.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Every blob under `root`, in listing order.
    async fn list_all(&self, root: &str) -> Result<Vec<BlobEntry>, StoreError>;

    /// A presentable URL for `key`, or `None` if the blob cannot be served.
    async fn display_url(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Face-recognition provider capable of searching a collection by image.
#[async_trait]
pub trait FaceSearch: Send + Sync {
    /// Matches for the largest face in `image`, ordered by descending similarity.
    async fn search_by_image(
        &self,
        image: &[u8],
        collection_id: &str,
        max_candidates: usize,
        similarity_threshold: f32,
    ) -> Result<Vec<FaceMatchCandidate>, SearchError>;
}
