//! pessbook-store — Collaborator implementations for the identity resolver.
//!
//! Provides a directory-backed and an in-memory blob store, a face-search
//! provider that replays recorded responses, and the collection-to-root map.

pub mod collections;
pub mod directory;
pub mod memory;
pub mod recorded;

pub use collections::{CollectionMap, CollectionMapError};
pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use recorded::RecordedSearch;
