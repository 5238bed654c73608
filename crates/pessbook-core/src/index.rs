//! Lookup index over a blob-store listing.
//!
//! Every entry is reachable under its key and, when the blob was tagged at
//! index time, under its external identifier. Colliding lookup keys resolve
//! to the entry listed last; the slot keeps the position of the first
//! insertion so that scans follow listing order.

use crate::types::BlobEntry;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct BlobIndex {
    slots: Vec<(String, BlobEntry)>,
    positions: HashMap<String, usize>,
}

impl BlobIndex {
    /// Build the index from a listing, in listing order.
    pub fn build(entries: &[BlobEntry]) -> Self {
        let mut index = Self::default();
        for entry in entries {
            if let Some(id) = entry.external_id.as_deref().filter(|id| !id.is_empty()) {
                index.insert(id.to_string(), entry.clone());
            }
            index.insert(entry.key.clone(), entry.clone());
        }
        tracing::debug!(entries = entries.len(), lookup_keys = index.len(), "built blob index");
        index
    }

    fn insert(&mut self, lookup_key: String, entry: BlobEntry) {
        match self.positions.get(&lookup_key) {
            Some(&pos) => self.slots[pos].1 = entry,
            None => {
                self.positions.insert(lookup_key.clone(), self.slots.len());
                self.slots.push((lookup_key, entry));
            }
        }
    }

    /// Exact lookup by external identifier or key.
    pub fn get(&self, lookup_key: &str) -> Option<&BlobEntry> {
        self.positions.get(lookup_key).map(|&pos| &self.slots[pos].1)
    }

    /// Lookup keys paired with their entries, in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BlobEntry)> {
        self.slots.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Number of distinct lookup keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
