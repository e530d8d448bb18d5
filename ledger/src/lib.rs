//! # CaféTrace Ledger
//!
//! An embeddable, append-only blockchain ledger for coffee supply-chain
//! traceability. Each block records one traceability entry (batch,
//! origin, harvest, grading, weight) and is sealed by a SHA-256
//! proof-of-work over a canonical JSON preimage, so any later mutation
//! of a committed entry is detectable by revalidation.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │          Ledger          │
//!                    │  append / query / info   │
//!                    └──────┬──────────┬────────┘
//!                           │          │
//!              ┌────────────▼───┐  ┌───▼──────────────┐
//!              │     chain      │  │      store       │
//!              │ block·pow·     │  │  JSON snapshot   │
//!              │ validate       │  │ backups·exports  │
//!              └────────┬───────┘  └──────────────────┘
//!                       │
//!              ┌────────▼───────┐  ┌──────────────────┐
//!              │     crypto     │  │      index       │
//!              │    SHA-256     │  │ memory / sled    │
//!              └────────────────┘  └──────────────────┘
//! ```
//!
//! The chain is the single source of truth. The secondary index is an
//! advisory read accelerator rebuilt from the chain whenever it falls
//! behind; losing it loses no data.
//!
//! ## Quick start
//!
//! ```no_run
//! use cafetrace_ledger::chain::{Ledger, LedgerConfig};
//! use cafetrace_ledger::record::TraceRecord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = Ledger::open(LedgerConfig::at("data"))?;
//!
//! let block = ledger.append(
//!     TraceRecord::new("BATCH-001", "Fazenda Santa Rosa", "2026-05-15", "A", 1500)
//!         .with_submitter("inspector1", "Joana Silva"),
//! )?;
//! println!("committed block {} ({})", block.index, block.hash);
//!
//! let info = ledger.get_chain_info();
//! assert!(info.is_valid);
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod crypto;
pub mod index;
pub mod record;
pub mod store;

pub use chain::{AppendError, Block, ChainInfo, Ledger, LedgerConfig, LedgerError};
pub use record::TraceRecord;
