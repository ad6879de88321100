//! # Node Runtime Library
//!
//! Wiring for the gradient ledger node. The main entry point is the
//! `main.rs` binary; the modules are exposed for integration tests.
//!
//! - `container/` - configuration and the ledger handle
//! - `adapters/` - wallet-backed identity and the in-process contract port
//! - `runtime` - startup sequence and serving

#![allow(missing_docs)]

pub mod adapters;
pub mod container;
pub mod runtime;

pub use adapters::{AuthenticatedSession, InProcessContract};
pub use container::{LedgerHandle, NodeConfig};
pub use runtime::NodeRuntime;
