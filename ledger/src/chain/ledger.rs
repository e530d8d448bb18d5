//! # Ledger Engine
//!
//! Owns the ordered block sequence and orchestrates the append pipeline:
//! build → mine → validate → commit → snapshot → index. Also exposes the
//! query operations callers use to read the chain.
//!
//! ## Lifecycle
//!
//! A ledger is constructed once at process start with [`Ledger::open`]
//! and passed by handle to every consumer — there is no global instance
//! and no lazy init. Opening either loads the persisted snapshot (a
//! corrupt snapshot fails the open; the engine never silently falls back
//! to a fresh genesis) or creates, mines, and persists a genesis block.
//! From then on the ledger is Active: appendable and queryable for the
//! process lifetime.
//!
//! ## Concurrency
//!
//! Single-writer by design. `append` holds the write lock across
//! read-tip, mine, validate, commit, and persist, so two callers can
//! never mine against the same tip. Queries take read locks and never
//! observe a chain mid-append. Mining is CPU-bound and runs on the
//! calling thread; callers serving requests may want to dispatch appends
//! to a dedicated thread.
//!
//! ## Durability
//!
//! The snapshot save is synchronous: `append` does not return success
//! until the chain is on disk. If the save fails, the in-memory commit
//! stands and the failure is surfaced as [`AppendError::Snapshot`] — an
//! at-most-once-durable gap the caller must treat as "retry the
//! snapshot, not the entry". The secondary index update is best-effort:
//! failures are logged and never fail the append.

use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{
    DEFAULT_BACKUP_DIR, DEFAULT_DIFFICULTY, DEFAULT_MAX_POW_ITERATIONS, DEFAULT_STORAGE_PATH,
};
use crate::index::{self, IndexBackend, IndexEntry, IndexError, SecondaryIndex};
use crate::record::{BlockData, EntryData, TraceRecord};
use crate::store::{SnapshotError, SnapshotStore};

use super::block::Block;
use super::pow::{self, PowError};
use super::validate::{self, ValidationError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Construction-time configuration for a [`Ledger`].
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Path of the chain snapshot file.
    pub storage_path: PathBuf,
    /// Directory for timestamped backups.
    pub backup_dir: PathBuf,
    /// Required leading zero hex characters on block hashes.
    pub difficulty: u32,
    /// Cap on nonce attempts per mined block.
    pub max_pow_iterations: u64,
    /// Which secondary index backend to open.
    pub index_backend: IndexBackend,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            difficulty: DEFAULT_DIFFICULTY,
            max_pow_iterations: DEFAULT_MAX_POW_ITERATIONS,
            index_backend: IndexBackend::Memory,
        }
    }
}

impl LedgerConfig {
    /// Configuration rooted at a data directory: snapshot and backups
    /// live under it, defaults for everything else.
    pub fn at(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        LedgerConfig {
            storage_path: data_dir.join("blockchain.json"),
            backup_dir: data_dir.join("backups"),
            ..LedgerConfig::default()
        }
    }

    /// Override the proof-of-work difficulty.
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Override the mining iteration cap.
    pub fn with_max_pow_iterations(mut self, cap: u64) -> Self {
        self.max_pow_iterations = cap;
        self
    }

    /// Select the secondary index backend.
    pub fn with_index_backend(mut self, backend: IndexBackend) -> Self {
        self.index_backend = backend;
        self
    }
}

// ---------------------------------------------------------------------------
// Errors & Views
// ---------------------------------------------------------------------------

/// Failures opening a ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The persisted snapshot could not be loaded. Fails closed: the
    /// operator must repair or explicitly remove the snapshot; the
    /// engine will not replace it with a fresh genesis.
    #[error("failed to load chain snapshot: {0}")]
    Load(#[source] SnapshotError),

    /// The freshly created genesis block could not be persisted.
    #[error("failed to persist genesis snapshot: {0}")]
    Persist(#[source] SnapshotError),

    /// Mining the genesis block exhausted the iteration cap.
    #[error("failed to mine genesis block: {0}")]
    Genesis(#[from] PowError),

    /// The secondary index backend could not be opened.
    #[error("failed to open secondary index: {0}")]
    Index(#[from] IndexError),
}

/// Failures appending an entry.
#[derive(Debug, Error)]
pub enum AppendError {
    /// The mined candidate failed validation; the chain is unmodified.
    #[error("invalid block, entry not added: {0}")]
    Validation(#[from] ValidationError),

    /// Mining exhausted the iteration cap; the chain is unmodified.
    #[error("mining failed: {0}")]
    Mining(#[from] PowError),

    /// The block was committed in memory but the snapshot save failed.
    /// Durability is behind until the next successful save.
    #[error("block {index} committed but snapshot save failed: {source}")]
    Snapshot {
        /// Index of the committed-but-unpersisted block.
        index: u64,
        /// The underlying store failure.
        #[source]
        source: SnapshotError,
    },
}

/// Point-in-time summary of the chain.
#[derive(Clone, Debug, Serialize)]
pub struct ChainInfo {
    /// Number of blocks, genesis included.
    pub length: usize,
    /// Proof-of-work difficulty in force.
    pub difficulty: u32,
    /// Result of a full validation pass, computed on demand — O(n) and
    /// deliberately uncached so it reflects the current state exactly.
    pub is_valid: bool,
    /// The most recently committed block.
    pub tip: Block,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The append-only, tamper-evident ledger of traceability entries.
pub struct Ledger {
    /// Invariant: never empty — index 0 is always the genesis block.
    blocks: RwLock<Vec<Block>>,
    store: SnapshotStore,
    index: Box<dyn SecondaryIndex>,
    difficulty: u32,
    max_pow_iterations: u64,
}

impl Ledger {
    /// Open a ledger: load the persisted chain if a snapshot exists,
    /// otherwise create, mine, and persist a genesis block.
    ///
    /// A memory-backed index starts empty and is rebuilt from the loaded
    /// chain here; a persistent index that has fallen behind the chain
    /// is topped up the same way.
    pub fn open(config: LedgerConfig) -> Result<Self, LedgerError> {
        let store = SnapshotStore::new(&config.storage_path, &config.backup_dir);
        let index = index::open(&config.index_backend)?;

        let (blocks, difficulty) = if store.exists() {
            let loaded = store.load().map_err(LedgerError::Load)?;
            (loaded.blocks, loaded.difficulty)
        } else {
            let genesis = pow::mine(
                Block::genesis(Utc::now().to_rfc3339()),
                config.difficulty,
                config.max_pow_iterations,
            )?;
            let blocks = vec![genesis];
            store
                .save(&blocks, config.difficulty)
                .map_err(LedgerError::Persist)?;
            info!(difficulty = config.difficulty, "created new chain with genesis block");
            (blocks, config.difficulty)
        };

        let ledger = Ledger {
            blocks: RwLock::new(blocks),
            store,
            index,
            difficulty,
            max_pow_iterations: config.max_pow_iterations,
        };

        // Advisory catch-up: a stale index is rebuilt, a failing one is
        // only logged — the ledger stays authoritative either way.
        let entry_count = ledger.len() - 1;
        match ledger.index.stats() {
            Ok(stats) if stats.total_entries < entry_count => {
                if let Err(err) = ledger.rebuild_index() {
                    warn!(error = %err, "secondary index rebuild failed on open");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "secondary index unavailable on open"),
        }

        Ok(ledger)
    }

    // -- Append -------------------------------------------------------------

    /// Append a traceability entry to the chain.
    ///
    /// Stamps the record with a submission timestamp and the entry-type
    /// tag, builds a candidate at `tip.index + 1`, mines it, validates
    /// it against the tip, commits, snapshots, and feeds the secondary
    /// index. Returns the committed block.
    ///
    /// On validation or mining failure the chain is left unmodified. On
    /// snapshot failure the in-memory commit stands and
    /// [`AppendError::Snapshot`] is returned.
    pub fn append(&self, record: TraceRecord) -> Result<Block, AppendError> {
        let mut blocks = self.blocks.write();
        let tip = blocks.last().expect("chain invariant: genesis always present");

        let candidate = Block::new(
            tip.index + 1,
            Utc::now().to_rfc3339(),
            BlockData::CoffeeEntry(EntryData {
                record,
                entry_timestamp: Utc::now().to_rfc3339(),
            }),
            tip.hash.clone(),
        );

        let mined = pow::mine(candidate, self.difficulty, self.max_pow_iterations)?;
        validate::validate_candidate(&mined, tip, self.difficulty)?;

        blocks.push(mined.clone());
        info!(
            index = mined.index,
            nonce = mined.nonce,
            hash = %mined.hash,
            "block committed"
        );

        if let Err(err) = self.store.save(&blocks, self.difficulty) {
            error!(index = mined.index, error = %err, "snapshot save failed after commit");
            return Err(AppendError::Snapshot {
                index: mined.index,
                source: err,
            });
        }

        if let Some(entry) = IndexEntry::from_block(&mined) {
            if let Err(err) = self.index.upsert(entry) {
                warn!(index = mined.index, error = %err, "secondary index update failed");
            }
        }

        Ok(mined)
    }

    // -- Queries ------------------------------------------------------------

    /// All entry blocks in chain order, genesis excluded.
    pub fn get_all_entries(&self) -> Vec<Block> {
        self.blocks.read().iter().skip(1).cloned().collect()
    }

    /// Blocks whose batch identifier matches exactly.
    ///
    /// Returns `None` when no entry matches — distinguishable from a
    /// present-but-empty result by construction.
    pub fn get_entry_by_batch(&self, batch_id: &str) -> Option<Vec<Block>> {
        let blocks = self.blocks.read();
        let matches: Vec<Block> = blocks
            .iter()
            .skip(1)
            .filter(|b| {
                b.data
                    .as_entry()
                    .map(|e| e.record.coffee_batch == batch_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        if matches.is_empty() {
            None
        } else {
            Some(matches)
        }
    }

    /// Blocks whose origin matches case-insensitively (exact match, not
    /// substring — the looser substring search lives on the index).
    pub fn get_entry_by_origin(&self, origin: &str) -> Option<Vec<Block>> {
        let needle = origin.to_lowercase();
        let blocks = self.blocks.read();
        let matches: Vec<Block> = blocks
            .iter()
            .skip(1)
            .filter(|b| {
                b.data
                    .as_entry()
                    .map(|e| e.record.origin.to_lowercase() == needle)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        if matches.is_empty() {
            None
        } else {
            Some(matches)
        }
    }

    /// Summary of the chain, with validity recomputed on demand.
    pub fn get_chain_info(&self) -> ChainInfo {
        let blocks = self.blocks.read();
        ChainInfo {
            length: blocks.len(),
            difficulty: self.difficulty,
            is_valid: validate::is_chain_valid(&blocks, self.difficulty),
            tip: blocks.last().expect("chain invariant: genesis always present").clone(),
        }
    }

    /// Run a full validation pass over the chain.
    pub fn is_chain_valid(&self) -> bool {
        validate::is_chain_valid(&self.blocks.read(), self.difficulty)
    }

    /// The most recently committed block.
    pub fn tip(&self) -> Block {
        self.blocks
            .read()
            .last()
            .expect("chain invariant: genesis always present")
            .clone()
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// Always false: an open ledger holds at least the genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// The proof-of-work difficulty in force.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    // -- Persistence helpers ------------------------------------------------

    /// Export the chain snapshot to an arbitrary path.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<PathBuf, SnapshotError> {
        let blocks = self.blocks.read();
        self.store.save_to(path, &blocks, self.difficulty)
    }

    /// Write a timestamped backup; returns the path written.
    pub fn create_backup(&self) -> Result<PathBuf, SnapshotError> {
        let blocks = self.blocks.read();
        self.store.backup(&blocks, self.difficulty)
    }

    // -- Secondary index ----------------------------------------------------

    /// The advisory secondary index, for accelerated lookups.
    pub fn index(&self) -> &dyn SecondaryIndex {
        self.index.as_ref()
    }

    /// Rebuild the secondary index wholesale from the chain. Returns the
    /// number of entries indexed.
    pub fn rebuild_index(&self) -> Result<usize, IndexError> {
        let blocks = self.blocks.read();
        self.index.clear()?;
        let mut indexed = 0;
        for block in blocks.iter().skip(1) {
            if let Some(entry) = IndexEntry::from_block(block) {
                self.index.upsert(entry)?;
                indexed += 1;
            }
        }
        info!(entries = indexed, "secondary index rebuilt");
        Ok(indexed)
    }
}
