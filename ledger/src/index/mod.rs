//! # Secondary Index
//!
//! A derived, rebuildable lookup structure that accelerates batch and
//! origin queries. The index is advisory: if it ever disagrees with the
//! ledger, the ledger wins, and callers needing authoritative data must
//! fall through to the ledger's own linear-scan queries. It is fed
//! synchronously after each committed append and can be rebuilt
//! wholesale from the chain at any time.
//!
//! Two backends implement the same [`SecondaryIndex`] trait and are
//! selected once at construction — call sites never branch on the
//! backend kind:
//!
//! - [`MemoryIndex`] — in-process concurrent map; rebuilt on startup.
//! - [`SledIndex`] — embedded key-value store; survives restarts.
//!
//! Note the deliberate divergence from the ledger's origin query: the
//! index matches origins by case-insensitive *substring*, while the
//! ledger matches case-insensitive *exact*. The index serves exploratory
//! lookups; the ledger serves the record of truth.

mod memory;
mod sled_backend;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::Block;
use crate::record::BlockData;

pub use memory::MemoryIndex;
pub use sled_backend::SledIndex;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by index backends.
///
/// Index errors are advisory by contract: the ledger logs them and keeps
/// going; they never fail an append.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The embedded key-value store failed.
    #[error("index storage error: {0}")]
    Sled(#[from] sled::Error),

    /// An entry could not be encoded or decoded.
    #[error("index serialization error: {0}")]
    Serialization(String),
}

// ---------------------------------------------------------------------------
// Entry & Stats
// ---------------------------------------------------------------------------

/// One index entry, keyed by the unique batch identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unique batch identifier (the upsert key).
    pub batch_id: String,
    /// Chain position of the block recording this batch.
    pub block_index: u64,
    /// Hash of that block, for cross-checking against the ledger.
    pub block_hash: String,
    /// Submitting inspector, when the record carried one.
    pub submitter_id: Option<String>,
    /// Origin farm or region.
    pub origin: String,
    /// Quality grade.
    pub quality_grade: String,
    /// Batch weight in kilograms.
    pub weight_kg: u64,
    /// RFC3339 timestamp of when this entry was indexed.
    pub indexed_at: String,
}

impl IndexEntry {
    /// Derive an index entry from a committed block.
    ///
    /// Returns `None` for the genesis block, which carries no batch.
    pub fn from_block(block: &Block) -> Option<Self> {
        match &block.data {
            BlockData::CoffeeEntry(entry) => Some(IndexEntry {
                batch_id: entry.record.coffee_batch.clone(),
                block_index: block.index,
                block_hash: block.hash.clone(),
                submitter_id: entry.record.submitter_id.clone(),
                origin: entry.record.origin.clone(),
                quality_grade: entry.record.quality_grade.clone(),
                weight_kg: entry.record.weight_kg,
                indexed_at: chrono::Utc::now().to_rfc3339(),
            }),
            BlockData::Genesis { .. } => None,
        }
    }
}

/// Counters reported by [`SecondaryIndex::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of indexed batches.
    pub total_entries: usize,
}

// ---------------------------------------------------------------------------
// Trait & Backend Selection
// ---------------------------------------------------------------------------

/// Fast lookup over committed entries, keyed by batch identifier.
pub trait SecondaryIndex: Send + Sync {
    /// Insert or replace the entry for its batch identifier.
    fn upsert(&self, entry: IndexEntry) -> Result<(), IndexError>;

    /// Look up a single entry by exact batch identifier.
    fn find_by_batch(&self, batch_id: &str) -> Result<Option<IndexEntry>, IndexError>;

    /// Find entries whose origin contains `origin`, case-insensitively.
    fn find_by_origin(&self, origin: &str) -> Result<Vec<IndexEntry>, IndexError>;

    /// All entries, ordered by block index.
    fn all(&self) -> Result<Vec<IndexEntry>, IndexError>;

    /// Counters over the indexed data.
    fn stats(&self) -> Result<IndexStats, IndexError>;

    /// Remove every entry. Used before a wholesale rebuild.
    fn clear(&self) -> Result<(), IndexError>;
}

/// Which backend a ledger's index should use, chosen at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexBackend {
    /// In-process map; empty on every startup and rebuilt from the chain.
    Memory,
    /// Embedded sled database at the given directory.
    Sled {
        /// Directory holding the sled database files.
        path: PathBuf,
    },
}

/// Open the configured index backend.
pub fn open(backend: &IndexBackend) -> Result<Box<dyn SecondaryIndex>, IndexError> {
    match backend {
        IndexBackend::Memory => Ok(Box::new(MemoryIndex::new())),
        IndexBackend::Sled { path } => Ok(Box::new(SledIndex::open(path)?)),
    }
}
