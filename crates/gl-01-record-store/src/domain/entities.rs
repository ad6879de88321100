//! # Core Entities
//!
//! Values held in, and produced by, the world state.

use serde::{Deserialize, Serialize};

/// SHA-256 digest.
pub type Hash = [u8; 32];

/// Ledger sequence number of a key's last write.
pub type Version = u64;

/// `prev_hash` of the first write-log entry.
pub const GENESIS_HASH: Hash = [0u8; 32];

/// A stored value together with the version that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: Version,
}

/// One item yielded by a range scan or rich query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single link in the tamper-evident write log.
///
/// `entry_hash = SHA-256(sequence ‖ len(key) ‖ key ‖ value_digest ‖ prev_hash)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub sequence: u64,
    pub key: String,
    pub value_digest: Hash,
    pub prev_hash: Hash,
    pub entry_hash: Hash,
}

impl LogEntry {
    /// Short hex form of the entry hash for log lines.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.entry_hash[..4])
    }
}
