//! Face-search provider that replays recorded responses.
//!
//! The recording is a JSON object mapping collection ids to the candidates
//! the hosted provider returned for them. Threshold, limit and ordering are
//! applied at query time the way the provider applies them.

use async_trait::async_trait;
use pessbook_core::{FaceMatchCandidate, FaceSearch, SearchError};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct RecordedSearch {
    responses: HashMap<String, Vec<FaceMatchCandidate>>,
}

impl RecordedSearch {
    pub fn new(responses: HashMap<String, Vec<FaceMatchCandidate>>) -> Self {
        Self { responses }
    }

    pub fn from_json_str(src: &str) -> Result<Self, SearchError> {
        serde_json::from_str(src)
            .map(Self::new)
            .map_err(|e| SearchError::Malformed(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SearchError> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Unavailable(format!("{}: {e}", path.display())))?;
        let search = Self::from_json_str(&src)?;
        tracing::info!(
            path = %path.display(),
            collections = search.responses.len(),
            "loaded recorded face-search responses"
        );
        Ok(search)
    }
}

#[async_trait]
impl FaceSearch for RecordedSearch {
    async fn search_by_image(
        &self,
        image: &[u8],
        collection_id: &str,
        max_candidates: usize,
        similarity_threshold: f32,
    ) -> Result<Vec<FaceMatchCandidate>, SearchError> {
        if image.is_empty() {
            return Err(SearchError::EmptyImage);
        }
        let recorded = self
            .responses
            .get(collection_id)
            .ok_or_else(|| SearchError::UnknownCollection(collection_id.to_string()))?;

        let mut matches: Vec<FaceMatchCandidate> = recorded
            .iter()
            .filter(|c| c.similarity >= similarity_threshold)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(max_candidates);

        tracing::debug!(
            collection = collection_id,
            recorded = recorded.len(),
            returned = matches.len(),
            "replayed face search"
        );
        Ok(matches)
    }
}
