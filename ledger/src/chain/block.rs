//! # Block Structure
//!
//! A block is the immutable record unit of the ledger. Each block carries
//! one traceability entry (or the genesis sentinel), a link to the
//! previous block's hash, and a proof-of-work nonce.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  index: u64            (0 = genesis)             │
//! │  timestamp: String     (RFC3339)                 │
//! │  data: BlockData       (entry or sentinel)       │
//! │  previous_hash: String ("0" for genesis)         │
//! │  nonce: u64            (proof-of-work counter)   │
//! │  hash: String          (SHA-256 hex of the rest) │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Canonical Serialization
//!
//! The hash input is the compact JSON rendering of the five content
//! fields with every object's keys sorted. Key ordering is a
//! correctness-critical contract, not a style choice: two semantically
//! identical payloads must hash identically regardless of the order in
//! which their fields were inserted. `serde_json`'s default `Map` is a
//! `BTreeMap`, so rendering through [`serde_json::Value`] sorts keys at
//! every nesting level.

use serde::{Deserialize, Serialize};

use crate::config::{GENESIS_MESSAGE, GENESIS_PREVIOUS_HASH};
use crate::crypto::hash::sha256_hex;
use crate::record::BlockData;

/// One immutable, hash-linked unit of the ledger.
///
/// Blocks are immutable after commit. The stored `hash` is always
/// recomputed at construction, never trusted from input; deserialized
/// blocks are cross-checked against a recomputation by the persistence
/// store before they are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Strictly sequential position in the chain, starting at 0.
    pub index: u64,
    /// RFC3339 timestamp of block construction.
    pub timestamp: String,
    /// The traceability entry (or genesis sentinel) this block records.
    pub data: BlockData,
    /// Hash of the predecessor block; `"0"` for genesis.
    pub previous_hash: String,
    /// Proof-of-work nonce found by the miner.
    pub nonce: u64,
    /// SHA-256 hex of the canonical serialization of the fields above.
    pub hash: String,
}

impl Block {
    /// Construct a block with `nonce = 0` and its hash computed.
    ///
    /// Construction cannot fail given well-typed inputs. The returned
    /// block does not yet satisfy any difficulty predicate — that is the
    /// miner's job.
    pub fn new(index: u64, timestamp: String, data: BlockData, previous_hash: String) -> Self {
        let mut block = Block {
            index,
            timestamp,
            data,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Construct the genesis block: index 0, sentinel payload, and the
    /// `"0"` previous-hash sentinel. Mined like any other block.
    pub fn genesis(timestamp: String) -> Self {
        Block::new(
            0,
            timestamp,
            BlockData::Genesis {
                message: GENESIS_MESSAGE.to_string(),
            },
            GENESIS_PREVIOUS_HASH.to_string(),
        )
    }

    /// The canonical, key-sorted JSON preimage of this block's hash.
    ///
    /// Covers `data`, `index`, `nonce`, `previous_hash`, and `timestamp`.
    /// The stored `hash` itself is excluded — it is the output, not part
    /// of the input.
    pub fn canonical_json(&self) -> String {
        serde_json::json!({
            "data": self.data,
            "index": self.index,
            "nonce": self.nonce,
            "previous_hash": self.previous_hash,
            "timestamp": self.timestamp,
        })
        .to_string()
    }

    /// Recompute the block hash from the current field values.
    ///
    /// Pure and side-effect-free; calling it twice on unchanged fields
    /// returns the same value. Use this to verify that the stored `hash`
    /// matches the actual content.
    pub fn compute_hash(&self) -> String {
        sha256_hex(self.canonical_json().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EntryData, TraceRecord};
    use serde_json::json;

    fn entry_data(batch: &str, origin: &str) -> BlockData {
        BlockData::CoffeeEntry(EntryData {
            record: TraceRecord::new(batch, origin, "2026-05-15", "A", 1000),
            entry_timestamp: "2026-08-23T12:00:00+00:00".to_string(),
        })
    }

    #[test]
    fn new_block_hash_matches_recomputation() {
        let block = Block::new(
            1,
            "2026-08-23T12:00:00+00:00".to_string(),
            entry_data("BATCH-001", "Farm A"),
            "abc123".to_string(),
        );
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn compute_hash_is_idempotent() {
        let block = Block::new(
            1,
            "2026-08-23T12:00:00+00:00".to_string(),
            entry_data("BATCH-001", "Farm A"),
            "abc123".to_string(),
        );
        assert_eq!(block.compute_hash(), block.compute_hash());
    }

    #[test]
    fn nonce_changes_the_hash() {
        let mut block = Block::new(
            1,
            "2026-08-23T12:00:00+00:00".to_string(),
            entry_data("BATCH-001", "Farm A"),
            "abc123".to_string(),
        );
        let before = block.compute_hash();
        block.nonce = 1;
        assert_ne!(before, block.compute_hash());
    }

    #[test]
    fn canonical_json_sorts_keys_at_every_level() {
        // Two records with extension fields inserted in opposite orders
        // must produce identical preimages and hashes.
        let record_ab = TraceRecord::new("BATCH-001", "Farm A", "2026-05-15", "A", 1000)
            .with_extra("altitude_m", json!(1250))
            .with_extra("varietal", json!("Bourbon"));
        let record_ba = TraceRecord::new("BATCH-001", "Farm A", "2026-05-15", "A", 1000)
            .with_extra("varietal", json!("Bourbon"))
            .with_extra("altitude_m", json!(1250));

        let make = |record: TraceRecord| {
            Block::new(
                1,
                "2026-08-23T12:00:00+00:00".to_string(),
                BlockData::CoffeeEntry(EntryData {
                    record,
                    entry_timestamp: "2026-08-23T12:00:00+00:00".to_string(),
                }),
                "abc123".to_string(),
            )
        };
        let block_ab = make(record_ab);
        let block_ba = make(record_ba);

        assert_eq!(block_ab.canonical_json(), block_ba.canonical_json());
        assert_eq!(block_ab.hash, block_ba.hash);
    }

    #[test]
    fn canonical_json_excludes_stored_hash() {
        let mut block = Block::new(
            1,
            "2026-08-23T12:00:00+00:00".to_string(),
            entry_data("BATCH-001", "Farm A"),
            "abc123".to_string(),
        );
        let preimage = block.canonical_json();
        // Overwriting the stored hash must not change the preimage.
        block.hash = "tampered".to_string();
        assert_eq!(block.canonical_json(), preimage);
    }

    #[test]
    fn genesis_block_properties() {
        let genesis = Block::genesis("2026-08-23T12:00:00+00:00".to_string());
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.nonce, 0);
        assert!(genesis.data.is_genesis());
        assert_eq!(genesis.hash, genesis.compute_hash());
    }

    #[test]
    fn genesis_is_deterministic_for_fixed_timestamp() {
        let a = Block::genesis("2026-08-23T12:00:00+00:00".to_string());
        let b = Block::genesis("2026-08-23T12:00:00+00:00".to_string());
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn block_serde_roundtrip() {
        let block = Block::new(
            3,
            "2026-08-23T12:00:00+00:00".to_string(),
            entry_data("BATCH-002", "farm b"),
            "00ab".to_string(),
        );
        let json = serde_json::to_string(&block).expect("serialize");
        let recovered: Block = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(block, recovered);
        assert_eq!(recovered.hash, recovered.compute_hash());
    }
}
