//! # World State
//!
//! The authoritative `key → (value, version)` map, its derived secondary
//! index and the write log, kept consistent as one unit.
//!
//! The map lives behind an `Arc` and is cloned on write only while a
//! snapshot is outstanding, so iterators hold a frozen view (INVARIANT-3)
//! without blocking writers.

use crate::domain::entities::{LogEntry, Version, VersionedValue};
use crate::domain::errors::StoreError;
use crate::domain::index::SecondaryIndex;
use crate::domain::value_objects::{StoreConfig, WriteCondition};
use crate::domain::write_log::{digest, WriteLog};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Frozen view of the primary map.
pub type Snapshot = Arc<BTreeMap<String, VersionedValue>>;

/// A write that passed its condition check and has its log entry built,
/// but is not yet visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedWrite {
    pub entry: LogEntry,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct WorldState {
    entries: Snapshot,
    index: SecondaryIndex,
    log: WriteLog,
}

impl WorldState {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            entries: Arc::new(BTreeMap::new()),
            index: SecondaryIndex::new(config.indexed_fields.clone()),
            log: WriteLog::new(),
        }
    }

    /// Rebuild from persisted parts.
    ///
    /// The index is recomputed and the whole state is checked against the
    /// log before it is handed out.
    pub fn restore(
        entries: BTreeMap<String, VersionedValue>,
        log: WriteLog,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        let mut index = SecondaryIndex::new(config.indexed_fields.clone());
        for (key, entry) in &entries {
            index.update(key, None, &entry.value);
        }
        let state = Self {
            entries: Arc::new(entries),
            index,
            log,
        };
        state.verify_integrity()?;
        Ok(state)
    }

    pub fn get(&self, key: &str) -> Option<&VersionedValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check `condition` and build the log entry for a write without
    /// touching the state.
    pub fn stage(
        &self,
        key: &str,
        value: &[u8],
        condition: WriteCondition,
    ) -> Result<StagedWrite, StoreError> {
        if key.is_empty() {
            return Err(StoreError::invalid_query("key must not be empty"));
        }

        let current = self.entries.get(key).map(|e| e.version);
        if !condition.holds(current) {
            return Err(StoreError::WriteConflict {
                key: key.to_string(),
                expected: condition.expected(),
                actual: current,
            });
        }

        Ok(StagedWrite {
            entry: self.log.prepare(key, value),
            value: value.to_vec(),
        })
    }

    /// Apply a write staged against this exact state. Returns its version.
    pub fn commit(&mut self, staged: StagedWrite) -> Version {
        let StagedWrite { entry, value } = staged;
        let version = entry.sequence;
        let key = entry.key.clone();
        self.log.push(entry);

        let entries = Arc::make_mut(&mut self.entries);
        let old = entries.insert(key.clone(), VersionedValue { value, version });
        if let Some(new) = entries.get(&key) {
            self.index
                .update(&key, old.as_ref().map(|o| o.value.as_slice()), &new.value);
        }
        version
    }

    /// Stage and commit in one step.
    pub fn apply(
        &mut self,
        key: &str,
        value: &[u8],
        condition: WriteCondition,
    ) -> Result<Version, StoreError> {
        let staged = self.stage(key, value, condition)?;
        Ok(self.commit(staged))
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.entries)
    }

    /// Index-backed candidate keys, or `None` if the field is not indexed.
    pub fn index_lookup(&self, field: &str, term: &str) -> Option<Vec<String>> {
        self.index.lookup(field, term)
    }

    pub fn log(&self) -> &WriteLog {
        &self.log
    }

    pub fn history(&self, key: &str) -> Vec<LogEntry> {
        self.log.entries_for(key)
    }

    /// Chain check plus world state ↔ log agreement.
    ///
    /// Every key's version must name a log entry for that key whose digest
    /// matches the stored bytes, and no later entry for the key may exist.
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        self.log.verify()?;

        let entries = self.log.entries();
        let mut latest: BTreeMap<&str, &LogEntry> = BTreeMap::new();
        for entry in entries {
            latest.insert(entry.key.as_str(), entry);
        }

        for (key, stored) in self.entries.iter() {
            let Some(entry) = latest.remove(key.as_str()) else {
                return Err(StoreError::TamperDetected {
                    sequence: stored.version,
                });
            };
            if entry.sequence != stored.version || entry.value_digest != digest(&stored.value) {
                return Err(StoreError::TamperDetected {
                    sequence: entry.sequence,
                });
            }
        }

        // Logged keys missing from the world state.
        if let Some(entry) = latest.values().next() {
            return Err(StoreError::TamperDetected {
                sequence: entry.sequence,
            });
        }
        Ok(())
    }

    /// Sequence of the last accepted write, 0 when empty.
    pub fn last_sequence(&self) -> u64 {
        self.log.len() as u64
    }

    #[cfg(test)]
    pub(crate) fn corrupt_value(&mut self, key: &str, value: &[u8]) {
        if let Some(entry) = Arc::make_mut(&mut self.entries).get_mut(key) {
            entry.value = value.to_vec();
        }
    }
}
