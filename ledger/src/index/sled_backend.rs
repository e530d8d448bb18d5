//! Embedded key-value index backend on sled.
//!
//! Entries live in a dedicated `entries` tree, keyed by the UTF-8 batch
//! identifier with bincode-encoded values. Writes are flushed so the
//! index survives restarts, which spares the ledger a full rebuild on
//! every startup.

use std::path::Path;

use sled::{Db, Tree};

use super::{IndexEntry, IndexError, IndexStats, SecondaryIndex};

/// sled-backed index keyed by batch identifier.
#[derive(Debug, Clone)]
pub struct SledIndex {
    db: Db,
    entries: Tree,
}

impl SledIndex {
    /// Open or create the index database at the given directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let db = sled::open(path)?;
        let entries = db.open_tree("entries")?;
        Ok(SledIndex { db, entries })
    }

    fn decode(bytes: &[u8]) -> Result<IndexEntry, IndexError> {
        bincode::deserialize(bytes).map_err(|e| IndexError::Serialization(e.to_string()))
    }
}

impl SecondaryIndex for SledIndex {
    fn upsert(&self, entry: IndexEntry) -> Result<(), IndexError> {
        let bytes =
            bincode::serialize(&entry).map_err(|e| IndexError::Serialization(e.to_string()))?;
        self.entries.insert(entry.batch_id.as_bytes(), bytes)?;
        self.db.flush()?;
        Ok(())
    }

    fn find_by_batch(&self, batch_id: &str) -> Result<Option<IndexEntry>, IndexError> {
        match self.entries.get(batch_id.as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn find_by_origin(&self, origin: &str) -> Result<Vec<IndexEntry>, IndexError> {
        let needle = origin.to_lowercase();
        let mut matches = Vec::new();
        for item in self.entries.iter() {
            let (_key, bytes) = item?;
            let entry = Self::decode(&bytes)?;
            if entry.origin.to_lowercase().contains(&needle) {
                matches.push(entry);
            }
        }
        matches.sort_by_key(|e| e.block_index);
        Ok(matches)
    }

    fn all(&self) -> Result<Vec<IndexEntry>, IndexError> {
        let mut entries = Vec::new();
        for item in self.entries.iter() {
            let (_key, bytes) = item?;
            entries.push(Self::decode(&bytes)?);
        }
        entries.sort_by_key(|e| e.block_index);
        Ok(entries)
    }

    fn stats(&self) -> Result<IndexStats, IndexError> {
        Ok(IndexStats {
            total_entries: self.entries.len(),
        })
    }

    fn clear(&self) -> Result<(), IndexError> {
        self.entries.clear()?;
        self.db.flush()?;
        Ok(())
    }
}
