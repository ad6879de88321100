//! # Domain Errors
//!
//! `NotFound` from the store becomes `NotExists` here; every other store
//! failure passes through untouched. Nothing is retried at this layer.

use gl_01_record_store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Query or revoke by id on a record that was never created.
    #[error("the record {record_id} does not exist")]
    NotExists { record_id: String },

    /// Stored bytes under `key` are not a valid gradient record.
    #[error("failed to decode record {key}: {message}")]
    Decode { key: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed transaction (unknown function, wrong arity, read-only misuse).
    #[error("validation failed: {message}")]
    Validation { message: String },
}

impl LifecycleError {
    pub fn validation(message: impl Into<String>) -> Self {
        LifecycleError::Validation {
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            LifecycleError::Store(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Lift a point-lookup failure, naming the record on `NotFound`.
    pub(crate) fn from_lookup(record_id: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => LifecycleError::NotExists {
                record_id: record_id.to_string(),
            },
            other => LifecycleError::Store(other),
        }
    }
}
