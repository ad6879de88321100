//! # Ledger Store Port
//!
//! Driven port consumed by the record lifecycle layer.
//!
//! Production: `FileBackedLedger`
//! Testing: `InMemoryLedger`

use crate::domain::entities::{LogEntry, Version, VersionedValue};
use crate::domain::errors::StoreError;
use crate::domain::selector::Selector;
use crate::ports::iterator::StateQueryIterator;

/// Versioned key-value world state with scoped range and predicate reads.
pub trait LedgerStore: Send + Sync {
    /// Insert or overwrite `key`. Returns the version assigned to the write.
    fn put(&self, key: &str, value: &[u8]) -> Result<Version, StoreError>;

    /// Write only if `key` is currently at `expected` (`None` = absent).
    ///
    /// Fails with the retryable `WriteConflict` otherwise.
    fn put_if_version(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<Version>,
    ) -> Result<Version, StoreError>;

    /// Value and version of `key`, or `NotFound`.
    fn get_versioned(&self, key: &str) -> Result<VersionedValue, StoreError>;

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.get_versioned(key).map(|v| v.value)
    }

    /// Half-open `[start, end)` scan; empty bounds are unbounded.
    fn range_scan(&self, start: &str, end: &str) -> Result<StateQueryIterator, StoreError>;

    fn query_by_predicate(&self, selector: &Selector) -> Result<StateQueryIterator, StoreError>;

    /// Rich-query string form, e.g. `{"selector":{"epochid":"7"}}`.
    fn query_rich(&self, query: &str) -> Result<StateQueryIterator, StoreError> {
        let selector = Selector::parse(query)?;
        self.query_by_predicate(&selector)
    }

    /// Write-log entries for `key`, oldest first.
    fn history(&self, key: &str) -> Result<Vec<LogEntry>, StoreError>;

    /// Recompute the write-log chain and check the world state against it.
    fn verify_write_log(&self) -> Result<(), StoreError>;

    /// Iterators opened and not yet released.
    fn open_cursors(&self) -> usize;
}
