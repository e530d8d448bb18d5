//! In-process index backend over a concurrent map.
//!
//! Holds nothing across restarts; the ledger rebuilds it from the chain
//! on startup. Suited to single-process deployments and tests.

use dashmap::DashMap;

use super::{IndexEntry, IndexError, IndexStats, SecondaryIndex};

/// Concurrent in-memory index keyed by batch identifier.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    entries: DashMap<String, IndexEntry>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        MemoryIndex {
            entries: DashMap::new(),
        }
    }
}

impl SecondaryIndex for MemoryIndex {
    fn upsert(&self, entry: IndexEntry) -> Result<(), IndexError> {
        self.entries.insert(entry.batch_id.clone(), entry);
        Ok(())
    }

    fn find_by_batch(&self, batch_id: &str) -> Result<Option<IndexEntry>, IndexError> {
        Ok(self.entries.get(batch_id).map(|e| e.value().clone()))
    }

    fn find_by_origin(&self, origin: &str) -> Result<Vec<IndexEntry>, IndexError> {
        let needle = origin.to_lowercase();
        let mut matches: Vec<IndexEntry> = self
            .entries
            .iter()
            .filter(|e| e.value().origin.to_lowercase().contains(&needle))
            .map(|e| e.value().clone())
            .collect();
        matches.sort_by_key(|e| e.block_index);
        Ok(matches)
    }

    fn all(&self) -> Result<Vec<IndexEntry>, IndexError> {
        let mut entries: Vec<IndexEntry> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by_key(|e| e.block_index);
        Ok(entries)
    }

    fn stats(&self) -> Result<IndexStats, IndexError> {
        Ok(IndexStats {
            total_entries: self.entries.len(),
        })
    }

    fn clear(&self) -> Result<(), IndexError> {
        self.entries.clear();
        Ok(())
    }
}
