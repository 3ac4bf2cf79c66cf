use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid payload: {size} bytes exceeds limit of {limit}")]
    InvalidPayload { size: usize, limit: usize },

    #[error("Block not found: index {index} (chain length {len})")]
    NotFound { index: u64, len: u64 },

    #[error("Cannot build a chain from zero blocks")]
    EmptyChain,

    #[error("No ledger at {0}")]
    LedgerMissing(String),

    #[error("Corruption: {0}")]
    Corruption(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
