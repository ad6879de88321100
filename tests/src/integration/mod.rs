//! # Integration Tests
//!
//! Flows across the store, the lifecycle contract and the gateway, wired
//! the way the node wires them.

pub mod concurrency;
pub mod e2e_send_dc_dm;
pub mod lifecycle_flows;
pub mod rpc_roundtrip;
