//! Hash-chained, append-only ledger.
//!
//! A [`Chain`] starts with a genesis block and seals every appended payload
//! into a [`Block`] whose hash covers its index, timestamp, payload and the
//! previous block's hash. [`Chain::verify`] replays the whole chain and names
//! the first block that no longer matches.

pub mod block;
pub mod chain;
pub mod clock;
pub mod config;
pub mod error;
pub mod hash;
pub mod store;
pub mod verify;

pub use block::Block;
pub use chain::Chain;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ChainConfig;
pub use error::{LedgerError, Result};
pub use hash::{compute_hash, Digest, GENESIS_PREV_HASH};
pub use store::LedgerStore;
pub use verify::{verify_blocks, Mismatch, ValidationResult};
