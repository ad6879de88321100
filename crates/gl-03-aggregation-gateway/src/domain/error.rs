//! Gateway error types with JSON-RPC 2.0 error codes.

use crate::domain::phase::RequestPhase;
use gl_01_record_store::StoreError;
use gl_02_record_lifecycle::LifecycleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standard JSON-RPC 2.0 error codes
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    pub const RESOURCE_UNAVAILABLE: i32 = -32002;
}

/// JSON-RPC error object returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Parse error - invalid JSON
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(
            codes::PARSE_ERROR,
            format!("Parse error: {}", details.into()),
        )
    }

    /// Invalid request - not a valid JSON-RPC request
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_REQUEST,
            format!("Invalid request: {}", details.into()),
        )
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_PARAMS,
            format!("Invalid params: {}", details.into()),
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            format!("Internal error: {}", details.into()),
        )
    }

    /// Record does not exist
    pub fn resource_not_found(resource: impl Into<String>) -> Self {
        Self::new(
            codes::RESOURCE_NOT_FOUND,
            format!("Resource not found: {}", resource.into()),
        )
    }

    /// Ledger unreachable, timed out, or lost a write race
    pub fn resource_unavailable(details: impl Into<String>) -> Self {
        Self::new(
            codes::RESOURCE_UNAVAILABLE,
            format!("Resource unavailable: {}", details.into()),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<&LifecycleError> for ApiError {
    fn from(e: &LifecycleError) -> Self {
        let api = match e {
            LifecycleError::NotExists { record_id } => ApiError::resource_not_found(record_id),
            LifecycleError::Validation { message } => ApiError::invalid_params(message),
            LifecycleError::Decode { .. } => ApiError::internal(e.to_string()),
            LifecycleError::Store(store) => match store {
                StoreError::NotFound { key } => ApiError::resource_not_found(key),
                StoreError::InvalidQuery { message } => ApiError::invalid_params(message),
                StoreError::WriteConflict { .. }
                | StoreError::Unavailable { .. }
                | StoreError::Locked { .. } => ApiError::resource_unavailable(store.to_string()),
                StoreError::TamperDetected { .. } | StoreError::Serialization { .. } => {
                    ApiError::internal(store.to_string())
                }
            },
        };
        api.with_data(serde_json::json!({ "retryable": e.is_retryable() }))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A `SendDcDm` step failed; no reply was produced.
    #[error("aggregation failed while {phase}: {source}")]
    Aggregation {
        phase: RequestPhase,
        source: LifecycleError,
    },

    /// A single contract call outside the aggregation flow failed.
    #[error(transparent)]
    Contract(#[from] LifecycleError),

    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn lifecycle(&self) -> Option<&LifecycleError> {
        match self {
            GatewayError::Aggregation { source, .. } => Some(source),
            GatewayError::Contract(e) => Some(e),
            _ => None,
        }
    }
}

impl From<&GatewayError> for ApiError {
    fn from(e: &GatewayError) -> Self {
        match e {
            GatewayError::Aggregation { phase, source } => {
                let mut api = ApiError::from(source);
                api.data = Some(serde_json::json!({
                    "phase": phase,
                    "retryable": source.is_retryable(),
                }));
                api
            }
            GatewayError::Contract(source) => ApiError::from(source),
            GatewayError::Config(_) | GatewayError::Bind(_) | GatewayError::Internal(_) => {
                ApiError::internal(e.to_string())
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        ApiError::from(&e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ApiError::method_not_found("gradients_foo");
        assert_eq!(err.code, codes::METHOD_NOT_FOUND);
        assert!(err.message.contains("gradients_foo"));
    }

    #[test]
    fn test_error_serialization_omits_empty_data() {
        let err = ApiError::invalid_params("missing 'epochId'");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("-32602"));
        assert!(!json.contains("data"));
    }

    #[test]
    fn test_lifecycle_mapping() {
        let cases = [
            (
                LifecycleError::NotExists {
                    record_id: "r".into(),
                },
                codes::RESOURCE_NOT_FOUND,
            ),
            (
                LifecycleError::Store(StoreError::unavailable("down")),
                codes::RESOURCE_UNAVAILABLE,
            ),
            (
                LifecycleError::Store(StoreError::WriteConflict {
                    key: "r".into(),
                    expected: Some(1),
                    actual: Some(2),
                }),
                codes::RESOURCE_UNAVAILABLE,
            ),
            (
                LifecycleError::Decode {
                    key: "r".into(),
                    message: "bad".into(),
                },
                codes::INTERNAL_ERROR,
            ),
            (LifecycleError::validation("arity"), codes::INVALID_PARAMS),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError::from(&err).code, code, "{err}");
        }
    }

    #[test]
    fn test_aggregation_error_carries_phase() {
        let err = GatewayError::Aggregation {
            phase: RequestPhase::Querying,
            source: LifecycleError::Store(StoreError::unavailable("timeout")),
        };
        let api = ApiError::from(&err);
        assert_eq!(api.code, codes::RESOURCE_UNAVAILABLE);
        let data = api.data.unwrap();
        assert_eq!(data["phase"], "querying");
        assert_eq!(data["retryable"], true);
    }
}
