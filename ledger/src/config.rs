//! # Ledger Constants
//!
//! Every magic number in the ledger engine lives here. The values below
//! are part of the on-disk and hash-input contracts: changing the genesis
//! message or the difficulty of an existing deployment invalidates every
//! previously persisted chain, so treat them as frozen once data exists.

// ---------------------------------------------------------------------------
// Proof of Work
// ---------------------------------------------------------------------------

/// Default number of leading `'0'` hex characters a block hash must carry.
///
/// Fixed, not adaptive. The gate exists to make tampering expensive to
/// hide, not to ration block production — there is exactly one writer.
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Default cap on nonce attempts before mining gives up.
///
/// Expected attempts for difficulty `d` are `16^d`, so at the default
/// difficulty of 2 the search finishes in a few hundred attempts. The cap
/// guards against a misconfigured difficulty hanging the single writer
/// forever; hitting it surfaces as a typed mining failure, never a hang.
pub const DEFAULT_MAX_POW_ITERATIONS: u64 = 1 << 32;

// ---------------------------------------------------------------------------
// Genesis
// ---------------------------------------------------------------------------

/// Sentinel `previous_hash` carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Sentinel payload message embedded in the genesis block.
pub const GENESIS_MESSAGE: &str = "Coffee Traceability Ledger Genesis Block";

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Default path of the chain snapshot file.
pub const DEFAULT_STORAGE_PATH: &str = "data/blockchain.json";

/// Default directory for timestamped backups.
pub const DEFAULT_BACKUP_DIR: &str = "data/backups";

/// Filename prefix for backup snapshots.
pub const BACKUP_FILE_PREFIX: &str = "blockchain_backup_";

/// Timestamp format embedded in backup filenames, e.g.
/// `blockchain_backup_20260823_141509.json`.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
