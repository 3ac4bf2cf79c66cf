use crate::block::Block;
use crate::config::ChainConfig;
use crate::error::{LedgerError, Result};
use crate::verify::{verify_blocks, ValidationResult};
use parking_lot::RwLock;

/// An append-only, hash-linked sequence of blocks. Never empty.
///
/// Appends hold the write lock for the whole read-tail, hash, push sequence,
/// so concurrent appends are serialized and never share a tail. Readers take
/// the read lock and only ever see fully sealed blocks.
pub struct Chain {
    blocks: RwLock<Vec<Block>>,
    config: ChainConfig,
}

impl Chain {
    /// Create a chain holding only the genesis block.
    pub fn new(config: ChainConfig) -> Self {
        let genesis = Block::genesis(config.clock.now());
        tracing::debug!(hash = %genesis.hash, "created genesis block");
        Self {
            blocks: RwLock::new(vec![genesis]),
            config,
        }
    }

    /// Rebuild a chain from previously exported blocks.
    ///
    /// Blocks are taken as-is; nothing is re-sealed. Run [`Chain::verify`]
    /// to find out whether they still hold together.
    pub fn from_blocks(config: ChainConfig, blocks: Vec<Block>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        tracing::debug!(len = blocks.len(), "loaded chain");
        Ok(Self {
            blocks: RwLock::new(blocks),
            config,
        })
    }

    /// Seal `data` into a new block at the tail and return it.
    pub fn append(&self, data: impl Into<Vec<u8>>) -> Result<Block> {
        let data = data.into();
        if let Some(limit) = self.config.max_payload_size {
            if data.len() > limit {
                tracing::warn!(size = data.len(), limit, "rejected oversized payload");
                return Err(LedgerError::InvalidPayload {
                    size: data.len(),
                    limit,
                });
            }
        }

        let mut blocks = self.blocks.write();
        let block = {
            let tail = match blocks.last() {
                Some(tail) => tail,
                None => return Err(LedgerError::EmptyChain),
            };
            let now = self.config.clock.now();
            let timestamp = if now < tail.timestamp {
                tracing::warn!(%now, tail = %tail.timestamp, "clock went backwards; reusing tail timestamp");
                tail.timestamp
            } else {
                now
            };
            let index = tail.index.checked_add(1).ok_or_else(|| {
                LedgerError::Corruption(format!("tail index {} has no successor", tail.index))
            })?;
            Block::seal(index, timestamp, data, tail.hash.clone())
        };
        tracing::debug!(index = block.index, hash = %block.hash, "appended block");
        blocks.push(block.clone());
        Ok(block)
    }

    /// Block at `index`.
    pub fn get(&self, index: u64) -> Result<Block> {
        let blocks = self.blocks.read();
        usize::try_from(index)
            .ok()
            .and_then(|i| blocks.get(i))
            .cloned()
            .ok_or(LedgerError::NotFound {
                index,
                len: blocks.len() as u64,
            })
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> u64 {
        self.blocks.read().len() as u64
    }

    /// Always false: a chain holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    pub fn genesis(&self) -> Result<Block> {
        self.get(0)
    }

    /// The most recently appended block.
    pub fn tail(&self) -> Result<Block> {
        self.blocks
            .read()
            .last()
            .cloned()
            .ok_or(LedgerError::EmptyChain)
    }

    /// Consistent snapshot of every block.
    pub fn blocks(&self) -> Vec<Block> {
        self.blocks.read().clone()
    }

    /// Blocks with `start <= index < end`, clamped to the chain.
    pub fn range(&self, start: u64, end: u64) -> Vec<Block> {
        let blocks = self.blocks.read();
        let len = blocks.len();
        let start = usize::try_from(start).unwrap_or(len).min(len);
        let end = usize::try_from(end).unwrap_or(len).min(len);
        if start >= end {
            return Vec::new();
        }
        blocks[start..end].to_vec()
    }

    /// Replay every hash and link.
    pub fn verify(&self) -> ValidationResult {
        verify_blocks(&self.blocks.read())
    }

    pub fn max_payload_size(&self) -> Option<usize> {
        self.config.max_payload_size
    }

    #[cfg(test)]
    pub(crate) fn with_block_mut<F: FnOnce(&mut Block)>(&self, index: usize, f: F) {
        f(&mut self.blocks.write()[index]);
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
