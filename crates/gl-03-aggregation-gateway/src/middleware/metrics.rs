//! Gateway counters, exported as JSON on `GET /metrics`.

use crate::domain::phase::RequestPhase;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_error: AtomicU64,
    pub write_requests_total: AtomicU64,

    // Aggregation flow
    pub records_created: AtomicU64,
    pub aggregations_replied: AtomicU64,
    pub failed_creating: AtomicU64,
    pub failed_querying: AtomicU64,
    pub failed_aggregating: AtomicU64,

    // Latency tracking (simplified - in production use histograms)
    pub total_latency_ms: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request
    pub fn record_request(&self, success: bool, is_write: bool, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if success {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }

        if is_write {
            self.write_requests_total.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
        self.request_count_for_latency
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replied(&self) {
        self.aggregations_replied.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a `SendDcDm` that failed while in `phase`.
    pub fn record_phase_failure(&self, phase: RequestPhase) {
        let counter = match phase {
            RequestPhase::Creating => &self.failed_creating,
            RequestPhase::Querying => &self.failed_querying,
            RequestPhase::Aggregating => &self.failed_aggregating,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
                "error": self.requests_error.load(Ordering::Relaxed),
                "writes": self.write_requests_total.load(Ordering::Relaxed),
            },
            "aggregation": {
                "records_created": self.records_created.load(Ordering::Relaxed),
                "replied": self.aggregations_replied.load(Ordering::Relaxed),
                "failed": {
                    "creating": self.failed_creating.load(Ordering::Relaxed),
                    "querying": self.failed_querying.load(Ordering::Relaxed),
                    "aggregating": self.failed_aggregating.load(Ordering::Relaxed),
                },
            },
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

/// Request timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
    is_write: bool,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>, is_write: bool) -> Self {
        Self {
            start: Instant::now(),
            metrics,
            is_write,
        }
    }

    pub fn finish(self, success: bool) {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.metrics
            .record_request(success, self.is_write, latency_ms);
    }
}
