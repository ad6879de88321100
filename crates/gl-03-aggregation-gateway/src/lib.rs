// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! # Aggregation Gateway (gl-03)
//!
//! Request/response front of the gradient ledger. The one core operation,
//! `SendDcDm`, stores a new record for an epoch and answers with everything
//! that epoch holds, reduced to two joined value lists and a count.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                AGGREGATION GATEWAY (gl-03)                  │
//! ├────────────────────────────────────────────────────────────┤
//! │   HTTP JSON-RPC (POST /)   GET /health   GET /metrics       │
//! │            │                                                │
//! │   CORS → Trace → BodyLimit → Timeout                        │
//! │            │                                                │
//! │   AggregationService                                        │
//! │     Received → Creating → Querying → Aggregating → Replied  │
//! │            │                                   └→ Failed    │
//! └────────────┼───────────────────────────────────────────────┘
//!              ▼
//!       LedgerContract (port) ──→ GradientsContract (gl-02)
//! ```
//!
//! # Methods
//!
//! | Method | Kind | Params |
//! |--------|------|--------|
//! | `gradients_sendDcDm` | write | `{valueA, valueB, epochId}` |
//! | `gradients_revokeGradients` | write | `{recordId}` |
//! | `gradients_queryRecord` | read | `{recordId}` |
//! | `gradients_queryRecordsByEpoch` | read | `{epochId}` |
//! | `gradients_queryAllRecords` | read | none |
//!
//! # Usage
//!
//! ```ignore
//! use gl_03_aggregation_gateway::{GatewayConfig, GatewayServer};
//!
//! let server = GatewayServer::new(GatewayConfig::default(), contract)?;
//! let listener = server.bind().await?;
//! server.serve(listener, shutdown_signal()).await?;
//! ```

pub mod domain;
pub mod middleware;
pub mod ports;
pub mod server;
pub mod service;

pub use domain::aggregate::{aggregate, Aggregator, RevokedPolicy, DEFAULT_SEPARATOR};
pub use domain::config::{
    parse_duration, AggregationConfig, ConfigError, CorsConfig, GatewayConfig, HttpConfig,
    LimitsConfig, TimeoutConfig,
};
pub use domain::error::{codes, ApiError, ApiResult, GatewayError};
pub use domain::methods::{MethodInfo, METHODS};
pub use domain::phase::{PhaseTracker, RequestPhase};
pub use domain::types::{DcDmReply, DcDmRequest, EpochParam, RecordIdParam};
pub use middleware::{GatewayMetrics, RequestTimer};
pub use ports::{IdGenerator, LedgerContract, UuidGenerator};
pub use server::GatewayServer;
pub use service::{failed_phase, AggregationService};
