//! Typed transaction request/response records.

use crate::domain::errors::LifecycleError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Submit goes through ordering and may write; evaluate is a read-only query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Submit,
    Evaluate,
}

/// Functions exported by the gradients contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractFunction {
    InitLedger,
    CreateRecord,
    QueryRecord,
    RevokeGradients,
    QueryAllRecords,
    QueryRecordByEpochId,
}

impl ContractFunction {
    pub const ALL: [ContractFunction; 6] = [
        ContractFunction::InitLedger,
        ContractFunction::CreateRecord,
        ContractFunction::QueryRecord,
        ContractFunction::RevokeGradients,
        ContractFunction::QueryAllRecords,
        ContractFunction::QueryRecordByEpochId,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ContractFunction::InitLedger => "InitLedger",
            ContractFunction::CreateRecord => "CreateRecord",
            ContractFunction::QueryRecord => "QueryRecord",
            ContractFunction::RevokeGradients => "RevokeGradients",
            ContractFunction::QueryAllRecords => "QueryAllRecords",
            ContractFunction::QueryRecordByEpochId => "QueryRecordByEpochID",
        }
    }

    /// Resolve a function name. The first letter is case-insensitive, so
    /// `createRecord` and `CreateRecord` name the same function.
    pub fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let first = chars.next()?;
        let normalized: String = first.to_uppercase().chain(chars).collect();
        Self::ALL.into_iter().find(|f| f.name() == normalized)
    }

    pub fn arity(&self) -> usize {
        match self {
            ContractFunction::InitLedger | ContractFunction::QueryAllRecords => 0,
            ContractFunction::QueryRecord
            | ContractFunction::RevokeGradients
            | ContractFunction::QueryRecordByEpochId => 1,
            ContractFunction::CreateRecord => 4,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(
            self,
            ContractFunction::InitLedger
                | ContractFunction::CreateRecord
                | ContractFunction::RevokeGradients
        )
    }
}

impl fmt::Display for ContractFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl TransactionRequest {
    pub fn submit<I, A>(function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            kind: TransactionKind::Submit,
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn evaluate<I, A>(function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            kind: TransactionKind::Evaluate,
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Raw JSON payload returned by a transaction. Empty for writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionResponse {
    pub payload: Vec<u8>,
}

impl TransactionResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn json<T: Serialize>(value: &T) -> Result<Self, LifecycleError> {
        serde_json::to_vec(value)
            .map(|payload| Self { payload })
            .map_err(|e| {
                LifecycleError::Store(gl_01_record_store::StoreError::Serialization {
                    message: e.to_string(),
                })
            })
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Decode the payload as `T`. `context` names the transaction in errors.
    pub fn decode<T: DeserializeOwned>(&self, context: &str) -> Result<T, LifecycleError> {
        serde_json::from_slice(&self.payload).map_err(|e| LifecycleError::Decode {
            key: context.to_string(),
            message: e.to_string(),
        })
    }
}
