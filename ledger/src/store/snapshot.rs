//! # Chain Snapshots
//!
//! Serializes the full ordered block list to a JSON file and loads it
//! back with integrity checks. The on-disk shape is:
//!
//! ```json
//! {
//!   "chain": [ { "index": 0, "timestamp": "...", "data": { ... },
//!                "previous_hash": "0", "nonce": 42, "hash": "00..." } ],
//!   "length": 1,
//!   "difficulty": 2,
//!   "last_updated": "2026-08-23T14:15:09+00:00"
//! }
//! ```
//!
//! Saves replace the whole file through a temp-file-plus-rename, so a
//! crash mid-write leaves the previous snapshot intact. Rewriting the
//! full chain on every append is a known scalability ceiling, kept
//! deliberately: switching to incremental appends would change the
//! on-disk format.
//!
//! Loads fail closed. An unparsable file, a length field that disagrees
//! with the block list, a non-sequential index, or a stored hash that
//! does not match recomputation all return [`SnapshotError::Corrupt`] —
//! the caller must never silently fall back to a fresh genesis.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::chain::Block;
use crate::config::{BACKUP_FILE_PREFIX, BACKUP_TIMESTAMP_FORMAT};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while saving, loading, or backing up snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem failure while reading or writing.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// The chain could not be encoded for writing.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persisted file is unparsable or internally inconsistent.
    #[error("corrupt snapshot: {reason}")]
    Corrupt {
        /// What exactly failed the integrity check.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Snapshot Shape
// ---------------------------------------------------------------------------

/// The persisted JSON document. Backups and exports use the same shape.
#[derive(Debug, Serialize, Deserialize)]
struct ChainSnapshot {
    chain: Vec<Block>,
    length: usize,
    difficulty: u32,
    last_updated: String,
}

/// A chain reconstructed from a snapshot, integrity-checked.
#[derive(Debug)]
pub struct LoadedChain {
    /// The ordered block list, every stored hash verified.
    pub blocks: Vec<Block>,
    /// The difficulty recorded at save time.
    pub difficulty: u32,
}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// File-backed persistence for the chain.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    backup_dir: PathBuf,
}

impl SnapshotStore {
    /// Create a store writing snapshots to `path` and backups under
    /// `backup_dir`. Nothing touches the filesystem until the first
    /// save or load.
    pub fn new(path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        SnapshotStore {
            path: path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when a snapshot file already exists. Drives the caller's
    /// load-or-create-genesis decision.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the full chain to the configured snapshot path, replacing
    /// prior content.
    pub fn save(&self, chain: &[Block], difficulty: u32) -> Result<(), SnapshotError> {
        write_snapshot(&self.path, chain, difficulty)
    }

    /// Write the full chain to an arbitrary path (export support).
    pub fn save_to(
        &self,
        path: impl AsRef<Path>,
        chain: &[Block],
        difficulty: u32,
    ) -> Result<PathBuf, SnapshotError> {
        let path = path.as_ref();
        write_snapshot(path, chain, difficulty)?;
        Ok(path.to_path_buf())
    }

    /// Load and integrity-check the snapshot.
    ///
    /// Each block's stored hash is cross-checked against a recomputation
    /// from its stored fields — genesis included — so a file edited
    /// behind the engine's back is rejected here rather than silently
    /// loaded. The stored hash is retained for comparison, never
    /// trusted as ground truth.
    pub fn load(&self) -> Result<LoadedChain, SnapshotError> {
        let raw = fs::read_to_string(&self.path)?;
        let snapshot: ChainSnapshot =
            serde_json::from_str(&raw).map_err(|e| SnapshotError::Corrupt {
                reason: format!("unparsable snapshot: {e}"),
            })?;

        if snapshot.chain.is_empty() {
            return Err(SnapshotError::Corrupt {
                reason: "snapshot contains no blocks".to_string(),
            });
        }
        if snapshot.length != snapshot.chain.len() {
            return Err(SnapshotError::Corrupt {
                reason: format!(
                    "recorded length {} does not match {} stored blocks",
                    snapshot.length,
                    snapshot.chain.len()
                ),
            });
        }
        for (position, block) in snapshot.chain.iter().enumerate() {
            if block.index != position as u64 {
                return Err(SnapshotError::Corrupt {
                    reason: format!(
                        "block at position {position} claims index {}",
                        block.index
                    ),
                });
            }
            if block.hash != block.compute_hash() {
                return Err(SnapshotError::Corrupt {
                    reason: format!("stored hash mismatch at block {position}"),
                });
            }
        }

        info!(
            blocks = snapshot.chain.len(),
            difficulty = snapshot.difficulty,
            path = %self.path.display(),
            "chain snapshot loaded"
        );
        Ok(LoadedChain {
            blocks: snapshot.chain,
            difficulty: snapshot.difficulty,
        })
    }

    /// Write a timestamped, non-overwriting backup copy under the backup
    /// directory. Returns the path written.
    pub fn backup(&self, chain: &[Block], difficulty: u32) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.backup_dir)?;

        let stamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut path = self
            .backup_dir
            .join(format!("{BACKUP_FILE_PREFIX}{stamp}.json"));
        // Two backups within the same second get a counter suffix
        // instead of clobbering each other.
        let mut attempt = 1u32;
        while path.exists() {
            path = self
                .backup_dir
                .join(format!("{BACKUP_FILE_PREFIX}{stamp}_{attempt}.json"));
            attempt += 1;
        }

        write_snapshot(&path, chain, difficulty)?;
        info!(path = %path.display(), "backup written");
        Ok(path)
    }
}

/// Serialize and atomically replace the file at `path`.
fn write_snapshot(path: &Path, chain: &[Block], difficulty: u32) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let snapshot = ChainSnapshot {
        chain: chain.to_vec(),
        length: chain.len(),
        difficulty,
        last_updated: Utc::now().to_rfc3339(),
    };
    let json = serde_json::to_string_pretty(&snapshot)?;

    // Temp-file-plus-rename: a crash mid-write leaves the old snapshot.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::pow::mine;
    use crate::record::{BlockData, EntryData, TraceRecord};

    const DIFFICULTY: u32 = 1;

    fn build_chain(entries: usize) -> Vec<Block> {
        let genesis = mine(
            Block::genesis("2026-08-23T12:00:00+00:00".to_string()),
            DIFFICULTY,
            u64::MAX,
        )
        .expect("mine genesis");
        let mut chain = vec![genesis];
        for i in 0..entries {
            let tip = chain.last().expect("non-empty");
            let candidate = Block::new(
                tip.index + 1,
                "2026-08-23T12:00:00+00:00".to_string(),
                BlockData::CoffeeEntry(EntryData {
                    record: TraceRecord::new(
                        format!("BATCH-{i:03}"),
                        "Farm A",
                        "2026-05-15",
                        "A",
                        1000,
                    ),
                    entry_timestamp: "2026-08-23T12:00:00+00:00".to_string(),
                }),
                tip.hash.clone(),
            );
            chain.push(mine(candidate, DIFFICULTY, u64::MAX).expect("mine"));
        }
        chain
    }

    fn store_in(dir: &tempfile::TempDir) -> SnapshotStore {
        SnapshotStore::new(
            dir.path().join("blockchain.json"),
            dir.path().join("backups"),
        )
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let chain = build_chain(3);

        assert!(!store.exists());
        store.save(&chain, DIFFICULTY).expect("save");
        assert!(store.exists());

        let loaded = store.load().expect("load");
        assert_eq!(loaded.blocks, chain);
        assert_eq!(loaded.difficulty, DIFFICULTY);
    }

    #[test]
    fn save_replaces_prior_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        let short = build_chain(1);
        store.save(&short, DIFFICULTY).expect("save short");
        let long = build_chain(4);
        store.save(&long, DIFFICULTY).expect("save long");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.blocks.len(), 5);
        assert_eq!(loaded.blocks, long);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        assert!(matches!(store.load(), Err(SnapshotError::Io(_))));
    }

    #[test]
    fn unparsable_file_fails_closed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(store.path(), "not json at all {").expect("write garbage");
        assert!(matches!(store.load(), Err(SnapshotError::Corrupt { .. })));
    }

    #[test]
    fn tampered_block_fails_closed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let chain = build_chain(2);
        store.save(&chain, DIFFICULTY).expect("save");

        // Edit the quality grade on disk without updating the hash.
        let raw = fs::read_to_string(store.path()).expect("read");
        let tampered = raw.replace("\"quality_grade\": \"A\"", "\"quality_grade\": \"F\"");
        assert_ne!(raw, tampered);
        fs::write(store.path(), tampered).expect("write tampered");

        assert!(matches!(store.load(), Err(SnapshotError::Corrupt { .. })));
    }

    #[test]
    fn length_mismatch_fails_closed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let chain = build_chain(1);
        store.save(&chain, DIFFICULTY).expect("save");

        let raw = fs::read_to_string(store.path()).expect("read");
        let tampered = raw.replace("\"length\": 2", "\"length\": 7");
        assert_ne!(raw, tampered);
        fs::write(store.path(), tampered).expect("write tampered");

        assert!(matches!(store.load(), Err(SnapshotError::Corrupt { .. })));
    }

    #[test]
    fn empty_chain_fails_closed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"chain": [], "length": 0, "difficulty": 2, "last_updated": "x"}"#,
        )
        .expect("write");
        assert!(matches!(store.load(), Err(SnapshotError::Corrupt { .. })));
    }

    #[test]
    fn backup_uses_timestamped_name_and_same_shape() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let chain = build_chain(2);

        let path = store.backup(&chain, DIFFICULTY).expect("backup");
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with(BACKUP_FILE_PREFIX));
        assert!(name.ends_with(".json"));

        // The backup parses as a regular snapshot.
        let raw = fs::read_to_string(&path).expect("read backup");
        let snapshot: serde_json::Value = serde_json::from_str(&raw).expect("parse backup");
        assert_eq!(snapshot["length"], 3);
        assert_eq!(snapshot["chain"].as_array().map(|c| c.len()), Some(3));
    }

    #[test]
    fn backups_never_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let chain = build_chain(1);

        let first = store.backup(&chain, DIFFICULTY).expect("first backup");
        let second = store.backup(&chain, DIFFICULTY).expect("second backup");
        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn export_to_arbitrary_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let chain = build_chain(1);

        let target = dir.path().join("exports").join("chain-export.json");
        let written = store.save_to(&target, &chain, DIFFICULTY).expect("export");
        assert_eq!(written, target);
        assert!(target.exists());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.save(&build_chain(1), DIFFICULTY).expect("save");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "tmp")
                    .unwrap_or(false)
            })
            .collect();
        assert!(leftovers.is_empty());
    }
}
