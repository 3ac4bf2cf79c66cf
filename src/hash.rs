use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest as _, Sha256};

/// SHA-256 digest as a lowercase hex string.
pub type Digest = String;

/// `prev_hash` of the genesis block: the all-zero 256-bit digest in hex.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Compute the digest of a block's canonical fields.
///
/// Each field is fed to SHA-256 behind a big-endian `u64` length prefix, in
/// this order:
///
/// 1. `index` as 8 big-endian bytes
/// 2. `timestamp` as RFC 3339 UTC with nanoseconds (`...T00:00:00.000000000Z`)
/// 3. `data` as raw bytes
/// 4. `prev_hash` as ASCII hex
///
/// The prefixes keep field boundaries unambiguous, so `(1, "2")` and
/// `(12, "")` never produce the same input stream.
pub fn compute_hash(
    index: u64,
    timestamp: &DateTime<Utc>,
    data: &[u8],
    prev_hash: &str,
) -> Digest {
    let timestamp = canonical_timestamp(timestamp);
    let mut hasher = Sha256::new();
    update_field(&mut hasher, &index.to_be_bytes());
    update_field(&mut hasher, timestamp.as_bytes());
    update_field(&mut hasher, data);
    update_field(&mut hasher, prev_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Timestamp text used inside the hash input.
pub fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
