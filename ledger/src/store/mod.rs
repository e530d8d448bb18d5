//! # Persistence
//!
//! File-backed persistence for the chain: a full JSON snapshot rewritten
//! after every successful append, loaded with integrity cross-checks on
//! startup, plus timestamped backups and exports.

pub mod snapshot;

pub use snapshot::{LoadedChain, SnapshotError, SnapshotStore};
