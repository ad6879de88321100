//! # Gradient Ledger Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Ledger, session and gateway builders
//! └── integration/      # Cross-crate flows
//!     ├── e2e_send_dc_dm.rs
//!     ├── lifecycle_flows.rs
//!     ├── concurrency.rs
//!     └── rpc_roundtrip.rs
//!
//! benches/ledger_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gl-tests
//! cargo test -p gl-tests integration::concurrency
//! cargo bench -p gl-tests
//! ```

pub mod fixtures;
pub mod integration;
