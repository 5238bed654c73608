//! pessbook-core — Face-match to identity reconciliation.
//!
//! Takes the ranked candidates returned by a face-search provider and joins
//! each one back to a stored image, a display name and a folder attribution,
//! using a chain of best-effort heuristics over the blob-store listing.

pub mod index;
pub mod naming;
pub mod resolver;
pub mod store;
pub mod strategy;
pub mod types;

pub use index::BlobIndex;
pub use resolver::{plan, Plan, ResolveError, Resolver, ResolverOptions, DEFAULT_PLACEHOLDER_IMAGE};
pub use store::{BlobStore, FaceSearch, SearchError, StoreError};
pub use types::{BlobEntry, EnrichedMatch, FaceMatchCandidate, MatchSource, PersonInfo};
