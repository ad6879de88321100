//! JSON-RPC 2.0 over HTTP.
//!
//! `POST /` takes a single request or a batch, `GET /health` and
//! `GET /metrics` report liveness and counters. A failed request is answered
//! with a JSON-RPC error object and never takes the server down.

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiError, ApiResult, GatewayError};
use crate::domain::methods;
use crate::domain::types::{DcDmRequest, EpochParam, RecordIdParam};
use crate::middleware::{create_cors_layer, GatewayMetrics, RequestTimer};
use crate::ports::LedgerContract;
use crate::service::AggregationService;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Longest accepted string request id.
const MAX_ID_LEN: usize = 256;

/// Aggregation Gateway HTTP server
pub struct GatewayServer {
    config: GatewayConfig,
    service: Arc<AggregationService>,
    metrics: Arc<GatewayMetrics>,
}

impl GatewayServer {
    pub fn new(
        config: GatewayConfig,
        contract: Arc<dyn LedgerContract>,
    ) -> Result<Self, GatewayError> {
        let service = AggregationService::new(contract, &config);
        Self::with_service(config, service)
    }

    /// Serve a pre-built service (custom id source, shared metrics).
    pub fn with_service(
        config: GatewayConfig,
        service: AggregationService,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let metrics = service.metrics();
        Ok(Self {
            config,
            service: Arc::new(service),
            metrics,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<AggregationService> {
        Arc::clone(&self.service)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Build HTTP router for JSON-RPC
    pub fn router(&self) -> Router {
        let state = AppState {
            service: Arc::clone(&self.service),
            metrics: Arc::clone(&self.metrics),
            max_batch_size: self.config.limits.max_batch_size,
        };

        let middleware = ServiceBuilder::new()
            .layer(create_cors_layer(&self.config.cors))
            .map_response(|res: axum::http::Response<_>| res.map(axum::body::Body::new))
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_request_size))
            .layer(TimeoutLayer::new(self.config.timeouts.request));

        Router::new()
            .route("/", post(handle_json_rpc))
            .route("/health", get(health_check))
            .route("/metrics", get(metrics_snapshot))
            .layer(middleware)
            .with_state(state)
    }

    /// Bind the configured HTTP address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, "[gl-03] 🚀 JSON-RPC server listening");

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        if let Err(e) = result {
            error!(error = %e, "[gl-03] HTTP server error");
            return Err(GatewayError::Internal(e.to_string()));
        }

        info!("[gl-03] JSON-RPC server stopped");
        Ok(())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    service: Arc<AggregationService>,
    metrics: Arc<GatewayMetrics>,
    max_batch_size: usize,
}

/// Handle JSON-RPC request
async fn handle_json_rpc(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let request: serde_json::Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_response(None, &ApiError::parse_error(e.to_string()))),
            );
        }
    };

    let response = match request.as_array() {
        Some(batch) if batch.is_empty() => {
            error_response(None, &ApiError::invalid_request("empty batch"))
        }
        Some(batch) if batch.len() > state.max_batch_size => error_response(
            None,
            &ApiError::invalid_request(format!(
                "batch of {} exceeds limit of {}",
                batch.len(),
                state.max_batch_size
            )),
        ),
        Some(batch) => {
            let mut responses = Vec::with_capacity(batch.len());
            for req in batch {
                responses.push(process_single_request(&state, req).await);
            }
            serde_json::Value::Array(responses)
        }
        None => process_single_request(&state, &request).await,
    };

    (StatusCode::OK, Json(response))
}

/// Process a single JSON-RPC request
async fn process_single_request(
    state: &AppState,
    request: &serde_json::Value,
) -> serde_json::Value {
    let id = request.get("id").cloned();

    if let Err(e) = validate_id(id.as_ref()) {
        return error_response(None, &e);
    }

    let Some(method) = request.get("method").and_then(|m| m.as_str()) else {
        return error_response(id, &ApiError::invalid_request("missing method"));
    };
    let params = request.get("params");

    let timer = RequestTimer::new(Arc::clone(&state.metrics), methods::is_write(method));
    let result = route_method(state, method, params).await;
    timer.finish(result.is_ok());

    match result {
        Ok(value) => serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": value
        }),
        Err(e) => error_response(id, &e),
    }
}

/// Ids must be a non-empty string (at most 256 chars) or a number.
/// Notifications (null or absent id) are not supported.
fn validate_id(id: Option<&serde_json::Value>) -> ApiResult<()> {
    match id {
        None | Some(serde_json::Value::Null) => Err(ApiError::invalid_request(
            "null id (notifications not supported)",
        )),
        Some(serde_json::Value::String(s)) if s.is_empty() => {
            Err(ApiError::invalid_request("empty string id"))
        }
        Some(serde_json::Value::String(s)) if s.len() > MAX_ID_LEN => Err(
            ApiError::invalid_request(format!("id string too long (max {MAX_ID_LEN} chars)")),
        ),
        Some(serde_json::Value::String(_)) | Some(serde_json::Value::Number(_)) => Ok(()),
        Some(_) => Err(ApiError::invalid_request("id must be string or number")),
    }
}

fn error_response(id: Option<serde_json::Value>, error: &ApiError) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error
    })
}

/// Route JSON-RPC method to appropriate handler.
async fn route_method(
    state: &AppState,
    method: &str,
    params: Option<&serde_json::Value>,
) -> ApiResult<serde_json::Value> {
    match method {
        methods::SEND_DC_DM => {
            let request = parse_dc_dm(params)?;
            to_result(&state.service.send_dc_dm(request).await?)
        }

        methods::REVOKE_GRADIENTS => {
            let record_id = parse_record_id(params)?;
            state.service.revoke_gradients(&record_id).await?;
            Ok(serde_json::json!(true))
        }

        methods::QUERY_RECORD => {
            let record_id = parse_record_id(params)?;
            to_result(&state.service.query_record(&record_id).await?)
        }

        methods::QUERY_RECORDS_BY_EPOCH => {
            let epoch_id = match parse_param_optional::<EpochParam>(params, 0) {
                Some(p) => p.epoch_id,
                None => parse_param::<String>(params, 0)?,
            };
            to_result(&state.service.query_records_by_epoch(&epoch_id).await?)
        }

        methods::QUERY_ALL_RECORDS => to_result(&state.service.query_all_records().await?),

        _ => Err(ApiError::method_not_found(method)),
    }
}

fn to_result<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// `{"valueA", "valueB", "epochId"}` or positional `["a", "b", "epoch"]`.
fn parse_dc_dm(params: Option<&serde_json::Value>) -> ApiResult<DcDmRequest> {
    if let Some(request) = parse_param_optional::<DcDmRequest>(params, 0) {
        return Ok(request);
    }
    Ok(DcDmRequest::new(
        parse_param::<String>(params, 0)?,
        parse_param::<String>(params, 1)?,
        parse_param::<String>(params, 2)?,
    ))
}

/// `{"recordId"}` or positional `["id"]`.
fn parse_record_id(params: Option<&serde_json::Value>) -> ApiResult<String> {
    match parse_param_optional::<RecordIdParam>(params, 0) {
        Some(p) => Ok(p.record_id),
        None => parse_param(params, 0),
    }
}

/// Parse a parameter from JSON-RPC params (array position or whole object).
fn parse_param<T: serde::de::DeserializeOwned>(
    params: Option<&serde_json::Value>,
    index: usize,
) -> ApiResult<T> {
    let param = param_at(params, index)
        .ok_or_else(|| ApiError::invalid_params(format!("missing parameter at index {}", index)))?;

    serde_json::from_value(param.clone()).map_err(|e| {
        ApiError::invalid_params(format!("invalid parameter at index {}: {}", index, e))
    })
}

/// Parse an optional parameter from JSON-RPC params.
fn parse_param_optional<T: serde::de::DeserializeOwned>(
    params: Option<&serde_json::Value>,
    index: usize,
) -> Option<T> {
    param_at(params, index).and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn param_at(params: Option<&serde_json::Value>, index: usize) -> Option<&serde_json::Value> {
    params.and_then(|p| {
        if p.is_array() {
            p.get(index)
        } else if index == 0 {
            Some(p)
        } else {
            None
        }
    })
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "aggregation-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}
