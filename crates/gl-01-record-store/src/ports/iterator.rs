//! # Scoped State Iterators
//!
//! Results of `range_scan` and `query_by_predicate` are produced lazily from
//! a copy-on-write snapshot taken when the iterator is opened (INVARIANT-3).
//!
//! ## Cursor Release (INVARIANT-4)
//!
//! Each iterator holds a [`CursorGuard`] registered with the store's
//! [`CursorTracker`]. The guard is dropped, and the cursor released, on the
//! first of:
//!
//! - the sequence being exhausted
//! - an error being yielded
//! - an explicit [`StateQueryIterator::close`]
//! - the iterator itself being dropped

use crate::domain::entities::KeyValue;
use crate::domain::errors::StoreError;
use crate::domain::selector::Selector;
use crate::domain::world_state::Snapshot;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub type KvResult = Result<KeyValue, StoreError>;

/// Counts cursors that are still open against a store.
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    open: Arc<AtomicUsize>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> CursorGuard {
        self.open.fetch_add(1, Ordering::SeqCst);
        CursorGuard {
            open: Arc::clone(&self.open),
        }
    }

    pub fn open_cursors(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

/// Releases one cursor slot when dropped.
#[derive(Debug)]
pub struct CursorGuard {
    open: Arc<AtomicUsize>,
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Lazy, finite, snapshot-consistent sequence of `(key, value)` pairs in
/// ascending key order.
pub struct StateQueryIterator {
    inner: Option<Box<dyn Iterator<Item = KvResult> + Send>>,
    guard: Option<CursorGuard>,
}

impl StateQueryIterator {
    pub fn new<I>(inner: I, guard: CursorGuard) -> Self
    where
        I: Iterator<Item = KvResult> + Send + 'static,
    {
        Self {
            inner: Some(Box::new(inner)),
            guard: Some(guard),
        }
    }

    /// Half-open `[start, end)` scan. An empty bound is unbounded.
    pub fn range(
        snapshot: Snapshot,
        start: &str,
        end: &str,
        guard: CursorGuard,
    ) -> Result<Self, StoreError> {
        if !start.is_empty() && !end.is_empty() && start > end {
            return Err(StoreError::invalid_query(format!(
                "range start '{start}' is after end '{end}'"
            )));
        }
        Ok(Self::new(SnapshotRange::new(snapshot, start, end), guard))
    }

    /// Selector evaluation over a snapshot.
    ///
    /// With `candidates` the index narrowed the key set; without it every
    /// key is visited. Both paths re-check the selector against the stored
    /// value, since the index only ever narrows.
    pub fn selection(
        snapshot: Snapshot,
        candidates: Option<Vec<String>>,
        selector: Selector,
        guard: CursorGuard,
    ) -> Self {
        match candidates {
            Some(keys) => {
                let items = keys.into_iter().filter_map(move |key| {
                    let entry = snapshot.get(&key)?;
                    selector
                        .matches(&entry.value)
                        .then(|| Ok(KeyValue::new(key, entry.value.clone())))
                });
                Self::new(items, guard)
            }
            None => {
                let items = SnapshotRange::new(snapshot, "", "").filter(move |item| match item {
                    Ok(kv) => selector.matches(&kv.value),
                    Err(_) => true,
                });
                Self::new(items, guard)
            }
        }
    }

    /// Whether the underlying cursor is still held.
    pub fn is_open(&self) -> bool {
        self.guard.is_some()
    }

    /// Release the cursor without consuming the rest of the sequence.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.inner = None;
        self.guard = None;
    }
}

impl Iterator for StateQueryIterator {
    type Item = KvResult;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.as_mut()?.next();
        match item {
            Some(Ok(kv)) => Some(Ok(kv)),
            Some(Err(e)) => {
                self.release();
                Some(Err(e))
            }
            None => {
                self.release();
                None
            }
        }
    }
}

impl std::fmt::Debug for StateQueryIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateQueryIterator")
            .field("open", &self.is_open())
            .finish()
    }
}

/// Walks a snapshot one key at a time, resuming after the last key seen.
struct SnapshotRange {
    snapshot: Snapshot,
    cursor: Bound<String>,
    end: Bound<String>,
}

impl SnapshotRange {
    fn new(snapshot: Snapshot, start: &str, end: &str) -> Self {
        let bound = |k: &str, inclusive: bool| {
            if k.is_empty() {
                Bound::Unbounded
            } else if inclusive {
                Bound::Included(k.to_string())
            } else {
                Bound::Excluded(k.to_string())
            }
        };
        Self {
            snapshot,
            cursor: bound(start, true),
            end: bound(end, false),
        }
    }

    fn exhausted(&self) -> bool {
        match (&self.cursor, &self.end) {
            (Bound::Included(c) | Bound::Excluded(c), Bound::Excluded(e)) => c >= e,
            _ => false,
        }
    }
}

impl Iterator for SnapshotRange {
    type Item = KvResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted() {
            return None;
        }
        let (key, entry) = self
            .snapshot
            .range::<String, _>((self.cursor.clone(), self.end.clone()))
            .next()?;
        let item = KeyValue::new(key.clone(), entry.value.clone());
        self.cursor = Bound::Excluded(key.clone());
        Some(Ok(item))
    }
}
