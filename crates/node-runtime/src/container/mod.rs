//! # Node Container
//!
//! Configuration and the ledger handle the rest of the node is wired from.
//!
//! ```text
//! NodeConfig ──→ LedgerHandle::open ──→ Arc<dyn LedgerStore>
//!                                          └→ GradientsContract (InitLedger once)
//! ```

pub mod config;
pub mod ledger;

pub use config::{ConfigError, IdentityConfig, LoggingConfig, NodeConfig, StorageBackend, StorageConfig};
pub use ledger::LedgerHandle;
