//! Cryptographic primitives for the ledger.
//!
//! The engine needs exactly one primitive: SHA-256 rendered as lowercase
//! hex, used for block content hashes and the proof-of-work predicate.

pub mod hash;

pub use hash::{sha256, sha256_hex};
