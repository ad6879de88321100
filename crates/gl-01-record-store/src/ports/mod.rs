//! # Ports Layer
//!
//! - `ledger` - The `LedgerStore` driven port consumed by the lifecycle layer
//! - `iterator` - Scoped, snapshot-backed result sequences

pub mod iterator;
pub mod ledger;
