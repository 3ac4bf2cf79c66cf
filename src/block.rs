use crate::hash::{compute_hash, Digest, GENESIS_PREV_HASH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload stored in the genesis block.
pub const GENESIS_DATA: &[u8] = b"Genesis Block";

/// A sealed ledger record linked to its predecessor by hash.
///
/// Fields serialize in the order `index, timestamp, data, prev_hash, hash`.
/// `data` is written as a JSON string when it is valid UTF-8 and as an array
/// of bytes otherwise; either form reads back to the same bytes.
/// Outside the crate a block is read-only; the only way to obtain one is
/// through a [`Chain`](crate::chain::Chain) or by deserializing stored records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) timestamp: DateTime<Utc>,
    #[serde(with = "payload")]
    pub(crate) data: Vec<u8>,
    pub(crate) prev_hash: Digest,
    pub(crate) hash: Digest,
}

impl Block {
    /// Seal a new block; the hash is computed from the other four fields.
    pub(crate) fn seal(
        index: u64,
        timestamp: DateTime<Utc>,
        data: Vec<u8>,
        prev_hash: Digest,
    ) -> Self {
        let hash = compute_hash(index, &timestamp, &data, &prev_hash);
        Self {
            index,
            timestamp,
            data,
            prev_hash,
            hash,
        }
    }

    /// The genesis block at the given time.
    pub(crate) fn genesis(timestamp: DateTime<Utc>) -> Self {
        Self::seal(0, timestamp, GENESIS_DATA.to_vec(), GENESIS_PREV_HASH.into())
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn prev_hash(&self) -> &str {
        &self.prev_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Recompute the digest from the stored fields.
    pub fn recompute_hash(&self) -> Digest {
        compute_hash(self.index, &self.timestamp, &self.data, &self.prev_hash)
    }

    /// Whether the stored hash matches the stored fields.
    pub fn verify(&self) -> bool {
        self.recompute_hash() == self.hash
    }
}

/// Record form of `data`: text when the bytes are UTF-8, a byte array otherwise.
mod payload {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Bytes(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(data) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.collect_seq(data),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.into_bytes(),
            Repr::Bytes(bytes) => bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_block_verifies() {
        let b = Block::seal(1, Utc::now(), b"hello".to_vec(), "ab".repeat(32));
        assert!(b.verify());
        assert_eq!(b.hash().len(), 64);
    }

    #[test]
    fn genesis_uses_sentinel() {
        let g = Block::genesis(Utc::now());
        assert!(g.is_genesis());
        assert_eq!(g.prev_hash(), GENESIS_PREV_HASH);
        assert_eq!(g.data(), GENESIS_DATA);
        assert!(g.verify());
    }

    #[test]
    fn tampered_block_fails_verify() {
        let mut b = Block::seal(1, Utc::now(), b"original".to_vec(), GENESIS_PREV_HASH.into());
        b.data = b"tampered".to_vec();
        assert!(!b.verify());
    }

    #[test]
    fn json_field_order_is_stable() {
        let b = Block::genesis(Utc::now());
        let json = serde_json::to_string(&b).unwrap();
        let positions: Vec<usize> = ["\"index\"", "\"timestamp\"", "\"data\"", "\"prev_hash\"", "\"hash\""]
            .iter()
            .map(|k| json.find(k).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn text_payload_is_written_as_string() {
        let b = Block::seal(1, Utc::now(), b"hello ledger".to_vec(), GENESIS_PREV_HASH.into());
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains(r#""data":"hello ledger""#));
    }

    #[test]
    fn binary_payload_survives_json() {
        let raw = vec![0xff, 0x00, 0xfe, b'a'];
        let b = Block::seal(2, Utc::now(), raw.clone(), GENESIS_PREV_HASH.into());
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains(r#""data":[255,0,254,97]"#));

        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data(), raw.as_slice());
        assert!(back.verify());
    }

    #[test]
    fn json_roundtrip_still_verifies() {
        let b = Block::seal(7, Utc::now(), b"payload".to_vec(), GENESIS_PREV_HASH.into());
        let back: Block = serde_json::from_str(&serde_json::to_string(&b).unwrap()).unwrap();
        assert_eq!(back, b);
        assert!(back.verify());
    }
}
