//! # Domain Errors
//!
//! Error types for the Record Store.
//!
//! The store surfaces raw failures. It never retries and never swallows an
//! error; callers decide what a failure means for them.

use crate::domain::entities::Version;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Point lookup on a key that was never written.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Versioned write lost a race with another writer (INVARIANT-6).
    #[error("write conflict on {key}: expected version {expected:?}, found {actual:?}")]
    WriteConflict {
        key: String,
        expected: Option<Version>,
        actual: Option<Version>,
    },

    /// Backend could not be reached or failed an I/O operation.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// Malformed range bounds or rich-query selector.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// The write log chain or the world state disagrees with the log (INVARIANT-5).
    #[error("tamper detected at log sequence {sequence}")]
    TamperDetected { sequence: u64 },

    /// Another process holds the data directory.
    #[error("ledger data directory is locked: {path}")]
    Locked { path: String },

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl StoreError {
    /// Whether repeating the same operation may succeed.
    ///
    /// Conflicts and transport failures are transient; everything else is
    /// deterministic and will fail again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::WriteConflict { .. } | StoreError::Unavailable { .. }
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        StoreError::InvalidQuery {
            message: message.into(),
        }
    }
}
