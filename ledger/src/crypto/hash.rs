//! # Hashing Utilities
//!
//! SHA-256 is the only hash function in the ledger. Block hashes, chain
//! linkage, and the proof-of-work predicate all operate on its lowercase
//! hex rendering, so the hex form is the canonical one — the raw digest
//! is an implementation detail.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// Returns the 32-byte digest. Most callers want [`sha256_hex`] instead;
/// this variant exists for call sites that need the raw bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Compute the SHA-256 hash and return it as a lowercase hex string.
///
/// This is the form stored in [`Block::hash`](crate::chain::Block) and
/// checked by the proof-of-work difficulty predicate, which counts
/// leading `'0'` hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256 of the empty string — the canonical test vector.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_deterministic() {
        let a = sha256_hex(b"arabica");
        let b = sha256_hex(b"arabica");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn sha256_hex_matches_raw_digest() {
        let digest = sha256(b"test data");
        assert_eq!(sha256_hex(b"test data"), hex::encode(digest));
    }

    #[test]
    fn sha256_case_sensitive_input() {
        assert_ne!(sha256_hex(b"Farm A"), sha256_hex(b"farm a"));
    }
}
