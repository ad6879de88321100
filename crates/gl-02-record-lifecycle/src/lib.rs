//! # Record Lifecycle (gl-02)
//!
//! Gradient records on top of the Record Store: creation, point and
//! epoch-scoped queries, and one-way revocation.
//!
//! ## Architecture
//!
//! ```text
//! gl-03 Gateway ──→ GradientsContract ──→ RecordLifecycleApi ──→ LedgerStore (gl-01)
//!                   (named transactions)   (typed operations)     (world state)
//! ```
//!
//! The lifecycle layer holds no state of its own. Every operation reads and
//! writes through the store handle it was built with.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement |
//! |----|-----------|-------------|
//! | 1 | Monotone revocation | `revoked` only ever goes `false → true`; overwrites carry it forward |
//! | 2 | Revoke needs existence | Revoking an unknown id fails before any write |
//! | 3 | No partial results | A single undecodable entry fails the whole query |
//! | 4 | Strict decode | Missing `dmvalue`, `dcvalue` or `epochid` is a decode error |

pub mod contract;
pub mod domain;
pub mod ports;
pub mod service;

pub use contract::{ContractFunction, GradientsContract, TransactionKind, TransactionRequest, TransactionResponse};
pub use domain::codec::{decode_record, encode_record};
pub use domain::entities::{GradientRecord, QueryResult, SEED_EPOCH, SEED_RECORD_COUNT};
pub use domain::errors::LifecycleError;
pub use ports::inbound::RecordLifecycleApi;
pub use service::RecordLifecycleService;
