//! Middleware stack for the gateway's HTTP surface.
//!
//! Layer order: Request → CORS → Trace → BodyLimit → Timeout → Handler

pub mod cors;
pub mod metrics;

pub use cors::create_cors_layer;
pub use metrics::{GatewayMetrics, RequestTimer};
