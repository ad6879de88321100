//! # Record Store (gl-01)
//!
//! The Record Store is the authoritative persistence layer for gradient
//! records. It models the world state of a permissioned ledger: string keys
//! mapped to opaque bytes, with every write versioned and chained into a
//! tamper-evident write log.
//!
//! ## Access Patterns
//!
//! ```text
//!                ┌──────────────── LedgerStore ────────────────┐
//!  put ─────────→│  world state (key → value, version)          │
//!  get ─────────→│        │                                      │
//!  range_scan ──→│        ├──→ StateQueryIterator (snapshot)     │
//!  query ───────→│  secondary index (field, value) → {keys}     │
//!                │  write log  seq → H(seq‖key‖H(v)‖prev)        │
//!                └──────────────────────────────────────────────┘
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Primary Key Uniqueness | One value per key; writes overwrite |
//! | 2 | Derived Index | Secondary index is rebuilt from, never read instead of, world state |
//! | 3 | Snapshot Reads | Iterators see the world state as of the moment they were opened |
//! | 4 | Cursor Release | Every iterator releases its cursor on exhaustion, error, close or drop |
//! | 5 | Chained Log | `entry_hash[n]` commits to `entry_hash[n-1]`; any edit breaks the chain |
//! | 6 | Monotone Versions | A key's version is the log sequence of its last write |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - World state, selector, secondary index, write log (no I/O)
//! - `ports/` - The `LedgerStore` trait and its scoped iterator
//! - `adapters/` - In-memory and file-backed ledgers
//!
//! ## Usage
//!
//! ```ignore
//! use gl_01_record_store::{InMemoryLedger, LedgerStore, Selector};
//!
//! let ledger = InMemoryLedger::new(StoreConfig::default());
//! ledger.put("REC0", br#"{"epochid":"7"}"#)?;
//!
//! let mut hits = ledger.query_by_predicate(&Selector::eq("epochid", "7"))?;
//! while let Some(kv) = hits.next() {
//!     let kv = kv?;
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryLedger;
#[cfg(feature = "file-backend")]
pub use adapters::{DataDirLock, FileBackedLedger};
pub use domain::entities::{Hash, KeyValue, LogEntry, Version, VersionedValue, GENESIS_HASH};
pub use domain::errors::StoreError;
pub use domain::selector::Selector;
pub use domain::value_objects::{StoreConfig, WriteCondition};
pub use domain::world_state::WorldState;
pub use ports::iterator::{CursorGuard, CursorTracker, StateQueryIterator};
pub use ports::ledger::LedgerStore;
