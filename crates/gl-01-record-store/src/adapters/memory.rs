//! In-memory ledger.

use crate::domain::entities::{LogEntry, Version, VersionedValue};
use crate::domain::errors::StoreError;
use crate::domain::selector::Selector;
use crate::domain::value_objects::{StoreConfig, WriteCondition};
use crate::domain::world_state::{Snapshot, StagedWrite, WorldState};
use crate::ports::iterator::{CursorTracker, StateQueryIterator};
use crate::ports::ledger::LedgerStore;
use parking_lot::RwLock;

/// World state behind a read-write lock.
///
/// Writers to different keys serialize on the lock but never interfere;
/// readers take a snapshot and release the lock before iterating.
pub struct InMemoryLedger {
    state: RwLock<WorldState>,
    cursors: CursorTracker,
}

impl InMemoryLedger {
    pub fn new(config: StoreConfig) -> Self {
        Self::from_state(WorldState::new(&config))
    }

    pub(crate) fn from_state(state: WorldState) -> Self {
        Self {
            state: RwLock::new(state),
            cursors: CursorTracker::new(),
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Stage a write, hand it to `persist`, then publish it.
    ///
    /// If `persist` fails nothing is published, so readers never see a write
    /// that did not reach its backing medium.
    pub(crate) fn write_staged<F>(
        &self,
        key: &str,
        value: &[u8],
        condition: WriteCondition,
        persist: F,
    ) -> Result<Version, StoreError>
    where
        F: FnOnce(&StagedWrite) -> Result<(), StoreError>,
    {
        let mut state = self.state.write();
        let staged = state.stage(key, value, condition)?;
        persist(&staged)?;
        Ok(state.commit(staged))
    }

    /// Live entries and the log sequence they are current through.
    pub(crate) fn checkpoint_view(&self) -> (Snapshot, u64) {
        let state = self.state.read();
        (state.snapshot(), state.last_sequence())
    }

    fn write(&self, key: &str, value: &[u8], condition: WriteCondition) -> Result<Version, StoreError> {
        let version = self.state.write().apply(key, value, condition)?;
        tracing::debug!(key, version, "[gl-01] write applied");
        Ok(version)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl LedgerStore for InMemoryLedger {
    fn put(&self, key: &str, value: &[u8]) -> Result<Version, StoreError> {
        self.write(key, value, WriteCondition::Always)
    }

    fn put_if_version(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<Version>,
    ) -> Result<Version, StoreError> {
        self.write(key, value, WriteCondition::from_expected(expected))
    }

    fn get_versioned(&self, key: &str) -> Result<VersionedValue, StoreError> {
        self.state
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<StateQueryIterator, StoreError> {
        let snapshot = self.state.read().snapshot();
        StateQueryIterator::range(snapshot, start, end, self.cursors.acquire())
    }

    fn query_by_predicate(&self, selector: &Selector) -> Result<StateQueryIterator, StoreError> {
        let (snapshot, candidates) = {
            let state = self.state.read();
            (
                state.snapshot(),
                state.index_lookup(selector.field(), &selector.term()),
            )
        };
        if candidates.is_none() {
            tracing::debug!(field = selector.field(), "[gl-01] unindexed selector, full scan");
        }
        Ok(StateQueryIterator::selection(
            snapshot,
            candidates,
            selector.clone(),
            self.cursors.acquire(),
        ))
    }

    fn history(&self, key: &str) -> Result<Vec<LogEntry>, StoreError> {
        Ok(self.state.read().history(key))
    }

    fn verify_write_log(&self) -> Result<(), StoreError> {
        let result = self.state.read().verify_integrity();
        if let Err(StoreError::TamperDetected { sequence }) = &result {
            tracing::error!(sequence, "[gl-01] write log verification failed");
        }
        result
    }

    fn open_cursors(&self) -> usize {
        self.cursors.open_cursors()
    }
}

#[cfg(test)]
impl InMemoryLedger {
    pub(crate) fn corrupt_value(&self, key: &str, value: &[u8]) {
        self.state.write().corrupt_value(key, value);
    }
}
