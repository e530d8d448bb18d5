//! # Proof of Work
//!
//! A simple brute-force nonce search: starting at 0, increment the nonce
//! and recompute the hash until it carries the required count of leading
//! `'0'` hex characters. The search order is fixed, so mining is
//! deterministic given identical inputs and difficulty.
//!
//! The search is capped. An uncapped loop would let a hostile or
//! malformed difficulty setting hang the single writer indefinitely;
//! exceeding the cap returns [`PowError::IterationsExhausted`] and the
//! candidate is discarded.

use thiserror::Error;

use super::block::Block;

/// Errors raised by the nonce search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PowError {
    /// The iteration cap was reached before a satisfying nonce was found.
    #[error("proof of work exhausted after {attempts} attempts at difficulty {difficulty}")]
    IterationsExhausted {
        /// Nonce values tried before giving up.
        attempts: u64,
        /// The difficulty that could not be satisfied.
        difficulty: u32,
    },
}

/// True iff `hash` has at least `difficulty` leading `'0'` hex characters.
///
/// Shared between the miner and the validator so both sides agree on
/// what "meets difficulty" means.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let required = difficulty as usize;
    hash.len() >= required && hash.as_bytes()[..required].iter().all(|&b| b == b'0')
}

/// Find a nonce for `block` satisfying the difficulty predicate.
///
/// Resets the nonce to 0 and counts upward, recomputing the hash on each
/// attempt. Returns the block with its final `nonce` and `hash` set, or
/// [`PowError::IterationsExhausted`] once `max_iterations` nonce values
/// have been tried without success.
pub fn mine(mut block: Block, difficulty: u32, max_iterations: u64) -> Result<Block, PowError> {
    block.nonce = 0;
    loop {
        block.hash = block.compute_hash();
        if meets_difficulty(&block.hash, difficulty) {
            return Ok(block);
        }
        if block.nonce + 1 >= max_iterations {
            return Err(PowError::IterationsExhausted {
                attempts: block.nonce + 1,
                difficulty,
            });
        }
        block.nonce += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BlockData, EntryData, TraceRecord};

    fn candidate() -> Block {
        Block::new(
            1,
            "2026-08-23T12:00:00+00:00".to_string(),
            BlockData::CoffeeEntry(EntryData {
                record: TraceRecord::new("BATCH-001", "Farm A", "2026-05-15", "A", 1000),
                entry_timestamp: "2026-08-23T12:00:00+00:00".to_string(),
            }),
            "00abcdef".to_string(),
        )
    }

    #[test]
    fn meets_difficulty_cases() {
        assert!(meets_difficulty("00ff", 2));
        assert!(meets_difficulty("00ff", 0));
        assert!(!meets_difficulty("0f00", 2));
        assert!(!meets_difficulty("f000", 1));
        // A hash shorter than the requirement can never satisfy it.
        assert!(!meets_difficulty("0", 2));
    }

    #[test]
    fn mined_block_satisfies_difficulty() {
        let mined = mine(candidate(), 2, u64::MAX).expect("mining should succeed");
        assert!(meets_difficulty(&mined.hash, 2));
        assert_eq!(mined.hash, mined.compute_hash());
    }

    #[test]
    fn mining_is_deterministic() {
        let a = mine(candidate(), 2, u64::MAX).expect("mine a");
        let b = mine(candidate(), 2, u64::MAX).expect("mine b");
        assert_eq!(a.nonce, b.nonce);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn mining_resets_a_dirty_nonce() {
        let mut block = candidate();
        block.nonce = 999_999;
        let mined = mine(block, 1, u64::MAX).expect("mine");
        let reference = mine(candidate(), 1, u64::MAX).expect("mine reference");
        assert_eq!(mined.nonce, reference.nonce);
    }

    #[test]
    fn exhaustion_returns_typed_error() {
        // Difficulty 64 (a fully zero hash) is unreachable within 4 attempts.
        let result = mine(candidate(), 64, 4);
        assert_eq!(
            result,
            Err(PowError::IterationsExhausted {
                attempts: 4,
                difficulty: 64,
            })
        );
    }

    #[test]
    fn zero_difficulty_accepts_first_nonce() {
        let mined = mine(candidate(), 0, u64::MAX).expect("mine");
        assert_eq!(mined.nonce, 0);
    }
}
