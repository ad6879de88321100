//! # Write Log
//!
//! Append-only, hash-chained record of every accepted write (INVARIANT-5).

use crate::domain::entities::{Hash, LogEntry, GENESIS_HASH};
use crate::domain::errors::StoreError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub fn digest(value: &[u8]) -> Hash {
    Sha256::digest(value).into()
}

pub fn entry_hash(sequence: u64, key: &str, value_digest: &Hash, prev_hash: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_be_bytes());
    hasher.update((key.len() as u64).to_be_bytes());
    hasher.update(key.as_bytes());
    hasher.update(value_digest);
    hasher.update(prev_hash);
    hasher.finalize().into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteLog {
    entries: Vec<LogEntry>,
}

impl WriteLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    /// Sequence the next append will receive. Sequences start at 1.
    pub fn next_sequence(&self) -> u64 {
        self.entries.len() as u64 + 1
    }

    pub fn head(&self) -> Hash {
        self.entries
            .last()
            .map(|e| e.entry_hash)
            .unwrap_or(GENESIS_HASH)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The entry the next append of `key = value` would add.
    pub fn prepare(&self, key: &str, value: &[u8]) -> LogEntry {
        let sequence = self.next_sequence();
        let value_digest = digest(value);
        let prev_hash = self.head();
        let entry_hash = entry_hash(sequence, key, &value_digest, &prev_hash);
        LogEntry {
            sequence,
            key: key.to_string(),
            value_digest,
            prev_hash,
            entry_hash,
        }
    }

    /// Add an entry built by [`WriteLog::prepare`] on the current head.
    pub fn push(&mut self, entry: LogEntry) -> &LogEntry {
        debug_assert_eq!(entry.sequence, self.next_sequence());
        debug_assert_eq!(entry.prev_hash, self.head());
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn append(&mut self, key: &str, value: &[u8]) -> &LogEntry {
        let entry = self.prepare(key, value);
        self.push(entry)
    }

    /// Recompute the chain from genesis.
    ///
    /// Returns the sequence of the first entry that does not link.
    pub fn verify(&self) -> Result<(), StoreError> {
        let mut prev = GENESIS_HASH;
        for (i, entry) in self.entries.iter().enumerate() {
            let expected_seq = i as u64 + 1;
            let recomputed =
                entry_hash(entry.sequence, &entry.key, &entry.value_digest, &entry.prev_hash);
            if entry.sequence != expected_seq
                || entry.prev_hash != prev
                || entry.entry_hash != recomputed
            {
                return Err(StoreError::TamperDetected {
                    sequence: expected_seq,
                });
            }
            prev = entry.entry_hash;
        }
        Ok(())
    }

    /// All writes to `key`, oldest first.
    pub fn entries_for(&self, key: &str) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.key == key)
            .cloned()
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn entries_mut(&mut self) -> &mut Vec<LogEntry> {
        &mut self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_links_to_genesis() {
        let mut log = WriteLog::new();
        let first = log.append("REC0", b"a").clone();
        let second = log.append("REC1", b"b").clone();

        assert_eq!(first.sequence, 1);
        assert_eq!(first.prev_hash, GENESIS_HASH);
        assert_eq!(second.prev_hash, first.entry_hash);
        assert_eq!(log.head(), second.entry_hash);
        assert!(log.verify().is_ok());
    }

    #[test]
    fn test_edited_entry_is_detected() {
        let mut log = WriteLog::new();
        log.append("REC0", b"a");
        log.append("REC1", b"b");
        log.append("REC2", b"c");

        log.entries_mut()[1].value_digest = digest(b"forged");
        assert_eq!(
            log.verify(),
            Err(StoreError::TamperDetected { sequence: 2 })
        );
    }

    #[test]
    fn test_dropped_entry_is_detected() {
        let mut log = WriteLog::new();
        log.append("REC0", b"a");
        log.append("REC1", b"b");
        log.append("REC2", b"c");

        log.entries_mut().remove(1);
        assert_eq!(
            log.verify(),
            Err(StoreError::TamperDetected { sequence: 2 })
        );
    }

    #[test]
    fn test_history_for_key() {
        let mut log = WriteLog::new();
        log.append("REC0", b"a");
        log.append("REC1", b"b");
        log.append("REC0", b"c");

        let history = log.entries_for("REC0");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sequence, 1);
        assert_eq!(history[1].sequence, 3);
        assert_eq!(history[1].value_digest, digest(b"c"));
    }
}
