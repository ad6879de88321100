//! # Adapters Layer
//!
//! - `memory` - In-memory ledger (tests, ephemeral nodes)
//! - `file` - Append-only log, journal and checkpoints over a locked data directory
//! - `lock` - Exclusive data-directory lock

#[cfg(feature = "file-backend")]
pub mod file;
#[cfg(feature = "file-backend")]
pub mod lock;
pub mod memory;

#[cfg(feature = "file-backend")]
pub use file::FileBackedLedger;
#[cfg(feature = "file-backend")]
pub use lock::DataDirLock;
pub use memory::InMemoryLedger;
