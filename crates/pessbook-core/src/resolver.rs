//! Identity resolution for one face search.
//!
//! The matching itself is synchronous and pure ([`plan`]); only the final
//! display-URL lookups touch the blob store. Those run concurrently, and
//! results are collected in candidate order rather than completion order.

use crate::index::BlobIndex;
use crate::naming::display_name;
use crate::store::{BlobStore, StoreError};
use crate::strategy::{first_resolution, parse_person_info, Resolution, Subject, DEFAULT_CHAIN};
use crate::types::{BlobEntry, EnrichedMatch, FaceMatchCandidate, PersonInfo};
use futures::stream::{self, StreamExt};
use thiserror::Error;

pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/images/placeholder-face.png";
pub const DEFAULT_URL_CONCURRENCY: usize = 8;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("could not list known images under {root}: {source}")]
    Listing {
        root: String,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Image shown for candidates without a resolvable photo.
    pub placeholder_image: String,
    /// Upper bound on in-flight display-URL lookups.
    pub url_concurrency: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            url_concurrency: DEFAULT_URL_CONCURRENCY,
        }
    }
}

/// Everything known about a candidate before any URL is fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub person_info: Option<PersonInfo>,
    pub resolution: Option<Resolution>,
    pub folder: String,
    pub display_name: String,
}

/// Run the heuristic chain and name derivation for a single candidate.
pub fn plan(candidate: &FaceMatchCandidate, index: &BlobIndex, root_path: &str) -> Plan {
    let person_info = candidate.external_id.as_deref().and_then(parse_person_info);
    let subject = Subject {
        candidate,
        person_info: person_info.as_ref(),
    };
    let resolution = first_resolution(&DEFAULT_CHAIN, &subject, index);

    let folder = resolution
        .as_ref()
        .filter(|r| r.source.sets_folder())
        .and_then(|r| r.folder.clone())
        .unwrap_or_else(|| root_path.to_string());

    let display_name = display_name(candidate.external_id.as_deref(), person_info.as_ref());

    Plan {
        person_info,
        resolution,
        folder,
        display_name,
    }
}

pub struct Resolver<S> {
    store: S,
    options: ResolverOptions,
}

impl<S: BlobStore> Resolver<S> {
    pub fn new(store: S, options: ResolverOptions) -> Self {
        Self { store, options }
    }

    /// List `root_path` once, then resolve every candidate against it.
    ///
    /// A failed listing is the only error: nothing can be resolved without it.
    pub async fn resolve_for_root(
        &self,
        candidates: &[FaceMatchCandidate],
        root_path: &str,
    ) -> Result<Vec<EnrichedMatch>, ResolveError> {
        let known_blobs = self
            .store
            .list_all(root_path)
            .await
            .map_err(|source| ResolveError::Listing {
                root: root_path.to_string(),
                source,
            })?;
        tracing::info!(root = root_path, blobs = known_blobs.len(), "listed known images");
        Ok(self.resolve_identities(candidates, root_path, &known_blobs).await)
    }

    /// Enrich `candidates` against a listing snapshot. Never fails; output
    /// has the same length and order as the input.
    pub async fn resolve_identities(
        &self,
        candidates: &[FaceMatchCandidate],
        root_path: &str,
        known_blobs: &[BlobEntry],
    ) -> Vec<EnrichedMatch> {
        let index = BlobIndex::build(known_blobs);

        let matches: Vec<EnrichedMatch> = stream::iter(candidates)
            .map(|candidate| {
                let planned = plan(candidate, &index, root_path);
                self.enrich(candidate, planned)
            })
            .buffered(self.options.url_concurrency.max(1))
            .collect()
            .await;

        let resolved = matches.iter().filter(|m| m.resolved_by.is_some()).count();
        tracing::info!(
            root = root_path,
            candidates = matches.len(),
            resolved,
            "resolved face matches"
        );
        matches
    }

    async fn enrich(&self, candidate: &FaceMatchCandidate, plan: Plan) -> EnrichedMatch {
        let image_src = match &plan.resolution {
            Some(resolution) => self.image_src(&resolution.key).await,
            None => self.options.placeholder_image.clone(),
        };

        tracing::debug!(
            face_id = %candidate.face_id,
            similarity = candidate.similarity,
            resolved_by = ?plan.resolution.as_ref().map(|r| r.source),
            "candidate resolved"
        );

        EnrichedMatch {
            face_id: candidate.face_id.clone(),
            similarity: candidate.similarity,
            external_id: candidate.external_id.clone(),
            image_src,
            folder: plan.folder,
            display_name: plan.display_name,
            person_info: plan.person_info,
            resolved_by: plan.resolution.map(|r| r.source),
        }
    }

    /// Display URL for `key`, degrading to the placeholder on any failure.
    async fn image_src(&self, key: &str) -> String {
        match self.store.display_url(key).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                tracing::debug!(key, "no display url; using placeholder");
                self.options.placeholder_image.clone()
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "display url lookup failed; using placeholder");
                self.options.placeholder_image.clone()
            }
        }
    }
}
