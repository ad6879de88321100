//! In-process `LedgerContract`: runs the gradients contract on the node's
//! own store, off the async executor.

use crate::adapters::wallet::AuthenticatedSession;
use async_trait::async_trait;
use gl_01_record_store::{LedgerStore, StoreError};
use gl_02_record_lifecycle::{
    GradientsContract, LifecycleError, RecordLifecycleService, TransactionRequest,
    TransactionResponse,
};
use gl_03_aggregation_gateway::LedgerContract;
use std::sync::Arc;
use tracing::trace;

/// Lifecycle service over whichever store backend was configured.
pub type LedgerApi = RecordLifecycleService<dyn LedgerStore>;

/// The contract as deployed in this process.
pub type DeployedContract = GradientsContract<LedgerApi>;

pub struct InProcessContract {
    contract: Arc<DeployedContract>,
    session: AuthenticatedSession,
}

impl InProcessContract {
    pub fn new(contract: Arc<DeployedContract>, session: AuthenticatedSession) -> Self {
        Self { contract, session }
    }

    pub fn session(&self) -> &AuthenticatedSession {
        &self.session
    }

    async fn run(&self, request: TransactionRequest) -> Result<TransactionResponse, LifecycleError> {
        trace!(
            identity = %self.session.label,
            channel = %self.session.channel,
            contract = %self.session.contract,
            kind = ?request.kind,
            function = %request.function,
            "Dispatching transaction"
        );
        let contract = Arc::clone(&self.contract);
        tokio::task::spawn_blocking(move || contract.execute(&request))
            .await
            .map_err(|e| {
                LifecycleError::Store(StoreError::unavailable(format!(
                    "ledger task failed: {e}"
                )))
            })?
    }
}

#[async_trait]
impl LedgerContract for InProcessContract {
    async fn submit_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<TransactionResponse, LifecycleError> {
        self.run(TransactionRequest::submit(function, args.iter().cloned()))
            .await
    }

    async fn evaluate_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<TransactionResponse, LifecycleError> {
        self.run(TransactionRequest::evaluate(function, args.iter().cloned()))
            .await
    }
}
