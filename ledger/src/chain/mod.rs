//! # Chain
//!
//! The hash-linked block structure and the machinery around it:
//!
//! ```text
//!   record ──► Block::new ──► pow::mine ──► validate ──► Ledger commit
//!                (hash)        (nonce)      (linkage)     (persist+index)
//! ```
//!
//! [`block`] defines the block and its canonical hash preimage,
//! [`pow`] the nonce search, [`validate`] the acceptance and full-chain
//! checks, and [`ledger`] the engine tying them together.

pub mod block;
pub mod ledger;
pub mod pow;
pub mod validate;

pub use block::Block;
pub use ledger::{AppendError, ChainInfo, Ledger, LedgerConfig, LedgerError};
pub use pow::PowError;
pub use validate::ValidationError;
