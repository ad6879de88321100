//! Outbound ports for the Aggregation Gateway.

use async_trait::async_trait;
use gl_02_record_lifecycle::{LifecycleError, TransactionRequest, TransactionResponse};

/// Authenticated handle on the gradients contract of one ledger channel.
///
/// Production: the in-process adapter in `node-runtime`
/// Testing: scripted mocks
#[async_trait]
pub trait LedgerContract: Send + Sync {
    /// Submit a transaction that may write to the ledger.
    async fn submit_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<TransactionResponse, LifecycleError>;

    /// Evaluate a read-only query.
    async fn evaluate_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<TransactionResponse, LifecycleError>;

    /// Dispatch a typed request to the matching call.
    async fn execute(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionResponse, LifecycleError> {
        match request.kind {
            gl_02_record_lifecycle::TransactionKind::Submit => {
                self.submit_transaction(&request.function, &request.args)
                    .await
            }
            gl_02_record_lifecycle::TransactionKind::Evaluate => {
                self.evaluate_transaction(&request.function, &request.args)
                    .await
            }
        }
    }
}

/// Source of fresh record ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
