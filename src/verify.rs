//! Integrity verification: replays every block's hash and link.

use crate::block::Block;
use crate::hash::GENESIS_PREV_HASH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a block failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mismatch {
    /// Stored hash differs from the hash recomputed from the block's fields.
    HashMismatch,
    /// `prev_hash` differs from the predecessor's hash (or the genesis sentinel).
    LinkMismatch,
    /// Stored index differs from the block's position in the chain.
    IndexMismatch,
}

/// Outcome of walking a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    Valid,
    Invalid { index: u64, reason: Mismatch },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mismatch::HashMismatch => "hash mismatch",
            Mismatch::LinkMismatch => "link mismatch",
            Mismatch::IndexMismatch => "index mismatch",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationResult::Valid => write!(f, "valid"),
            ValidationResult::Invalid { index, reason } => {
                write!(f, "invalid at block {}: {}", index, reason)
            }
        }
    }
}

/// Walk `blocks` from the genesis forward and report the first broken block.
///
/// Each block is checked for its own hash, then its link to the predecessor,
/// then its position. Deleted or reordered blocks therefore surface as a
/// link mismatch; a position check only fires for a block whose index was
/// rewritten consistently with its hash and link. Genesis is held to the same rules, with
/// [`GENESIS_PREV_HASH`] standing in for the missing predecessor.
pub fn verify_blocks(blocks: &[Block]) -> ValidationResult {
    let mut expected_prev = GENESIS_PREV_HASH;

    for (position, block) in blocks.iter().enumerate() {
        let position = position as u64;
        if !block.verify() {
            return invalid(position, Mismatch::HashMismatch);
        }
        if block.prev_hash != expected_prev {
            return invalid(position, Mismatch::LinkMismatch);
        }
        if block.index != position {
            return invalid(position, Mismatch::IndexMismatch);
        }
        expected_prev = block.hash.as_str();
    }

    ValidationResult::Valid
}

fn invalid(index: u64, reason: Mismatch) -> ValidationResult {
    tracing::warn!(index, %reason, "chain verification failed");
    ValidationResult::Invalid { index, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn build(n: usize) -> Vec<Block> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut blocks = vec![Block::genesis(start)];
        for i in 1..n {
            let prev = blocks[i - 1].hash.clone();
            let ts = start + Duration::seconds(i as i64);
            blocks.push(Block::seal(i as u64, ts, format!("block {}", i).into_bytes(), prev));
        }
        blocks
    }

    #[test]
    fn empty_and_genesis_only_are_valid() {
        assert_eq!(verify_blocks(&[]), ValidationResult::Valid);
        assert_eq!(verify_blocks(&build(1)), ValidationResult::Valid);
    }

    #[test]
    fn untouched_chain_is_valid() {
        assert!(verify_blocks(&build(5)).is_valid());
    }

    #[test]
    fn tampered_data_reports_hash_mismatch_at_that_block() {
        for k in 0..4 {
            let mut blocks = build(4);
            blocks[k].data = b"tampered".to_vec();
            assert_eq!(
                verify_blocks(&blocks),
                ValidationResult::Invalid {
                    index: k as u64,
                    reason: Mismatch::HashMismatch
                }
            );
        }
    }

    #[test]
    fn rehashed_block_breaks_successor_link() {
        let mut blocks = build(4);
        blocks[1].data = b"rewritten".to_vec();
        blocks[1].hash = blocks[1].recompute_hash();
        assert_eq!(
            verify_blocks(&blocks),
            ValidationResult::Invalid {
                index: 2,
                reason: Mismatch::LinkMismatch
            }
        );
    }

    #[test]
    fn deleted_block_is_detected() {
        let mut blocks = build(4);
        blocks.remove(2);
        assert_eq!(
            verify_blocks(&blocks),
            ValidationResult::Invalid {
                index: 2,
                reason: Mismatch::LinkMismatch
            }
        );
    }

    #[test]
    fn reordered_blocks_are_detected() {
        let mut blocks = build(4);
        blocks.swap(1, 2);
        assert_eq!(
            verify_blocks(&blocks),
            ValidationResult::Invalid {
                index: 1,
                reason: Mismatch::LinkMismatch
            }
        );
    }

    #[test]
    fn resealed_block_with_wrong_index_is_index_mismatch() {
        let mut blocks = build(3);
        let resealed = {
            let b = &blocks[2];
            Block::seal(7, b.timestamp, b.data.clone(), b.prev_hash.clone())
        };
        blocks[2] = resealed;
        assert_eq!(
            verify_blocks(&blocks),
            ValidationResult::Invalid {
                index: 2,
                reason: Mismatch::IndexMismatch
            }
        );
    }

    #[test]
    fn genesis_with_wrong_sentinel_is_link_mismatch() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let g = Block::seal(0, start, b"g".to_vec(), "ff".repeat(32));
        assert_eq!(
            verify_blocks(&[g]),
            ValidationResult::Invalid {
                index: 0,
                reason: Mismatch::LinkMismatch
            }
        );
    }

    #[test]
    fn display_formats() {
        assert_eq!(ValidationResult::Valid.to_string(), "valid");
        let r = ValidationResult::Invalid {
            index: 3,
            reason: Mismatch::LinkMismatch,
        };
        assert_eq!(r.to_string(), "invalid at block 3: link mismatch");
    }
}
