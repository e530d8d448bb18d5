//! # Chain Validation
//!
//! Verifies hash linkage, content-hash correctness, and proof-of-work
//! compliance — for a single candidate against the current tip, or for
//! the whole chain.
//!
//! Validation never mutates anything and is idempotent: validating the
//! same chain twice without mutation yields the same result. Any single
//! failing block invalidates the whole chain; there is no partial
//! validity.

use thiserror::Error;

use super::block::Block;
use super::pow::meets_difficulty;

/// A specific integrity check that failed.
///
/// The variants are ordered the way checks run; the first failure wins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The candidate's index is not `tip.index + 1`.
    #[error("non-sequential index: tip is at {tip}, candidate claims {candidate}")]
    NonSequentialIndex {
        /// Index of the current tip.
        tip: u64,
        /// Index claimed by the candidate.
        candidate: u64,
    },

    /// The block's `previous_hash` does not equal its predecessor's hash.
    #[error("broken linkage at block {index}: previous_hash does not match predecessor")]
    BrokenLinkage {
        /// Index of the block whose linkage is broken.
        index: u64,
    },

    /// The stored hash does not match a recomputation from the block's
    /// own fields — the content was altered after hashing.
    #[error("hash mismatch at block {index}: stored hash does not match recomputation")]
    HashMismatch {
        /// Index of the altered block.
        index: u64,
    },

    /// The block's hash does not carry the required leading zeros.
    #[error("difficulty not met at block {index}: hash lacks {difficulty} leading zeros")]
    DifficultyNotMet {
        /// Index of the offending block.
        index: u64,
        /// The difficulty that was required.
        difficulty: u32,
    },
}

/// Validate a mined candidate block against the current tip.
///
/// Checks, in order: sequential index, previous-hash linkage, stored
/// hash versus recomputation, and the difficulty predicate. Returns the
/// first failed check as a typed error.
pub fn validate_candidate(
    candidate: &Block,
    tip: &Block,
    difficulty: u32,
) -> Result<(), ValidationError> {
    if candidate.index != tip.index + 1 {
        return Err(ValidationError::NonSequentialIndex {
            tip: tip.index,
            candidate: candidate.index,
        });
    }
    if candidate.previous_hash != tip.hash {
        return Err(ValidationError::BrokenLinkage {
            index: candidate.index,
        });
    }
    if candidate.hash != candidate.compute_hash() {
        return Err(ValidationError::HashMismatch {
            index: candidate.index,
        });
    }
    if !meets_difficulty(&candidate.hash, difficulty) {
        return Err(ValidationError::DifficultyNotMet {
            index: candidate.index,
            difficulty,
        });
    }
    Ok(())
}

/// Boolean form of [`validate_candidate`].
pub fn is_valid_candidate(candidate: &Block, tip: &Block, difficulty: u32) -> bool {
    validate_candidate(candidate, tip, difficulty).is_ok()
}

/// Validate every adjacent pair of the chain from index 1 onward.
///
/// Each non-genesis block must match its own hash recomputation, link to
/// its predecessor's hash, and meet the difficulty predicate. Genesis is
/// exempt from the linkage and difficulty checks here; its hash is
/// cross-checked at load time by the persistence store.
pub fn validate_chain(chain: &[Block], difficulty: u32) -> Result<(), ValidationError> {
    for pair in chain.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.hash != current.compute_hash() {
            return Err(ValidationError::HashMismatch {
                index: current.index,
            });
        }
        if current.previous_hash != previous.hash {
            return Err(ValidationError::BrokenLinkage {
                index: current.index,
            });
        }
        if !meets_difficulty(&current.hash, difficulty) {
            return Err(ValidationError::DifficultyNotMet {
                index: current.index,
                difficulty,
            });
        }
    }
    Ok(())
}

/// Boolean form of [`validate_chain`].
pub fn is_chain_valid(chain: &[Block], difficulty: u32) -> bool {
    validate_chain(chain, difficulty).is_ok()
}
