//! # Aggregation Service
//!
//! `SendDcDm`: create a record under a fresh id, read the whole epoch back
//! and reduce it into two joined lists and a count.
//!
//! The service holds no state between requests. Two concurrent calls for the
//! same epoch are ordered only by the ledger; each sees whatever the ledger
//! had committed when its query ran. A caller that goes away after the create
//! has committed does not roll the create back.

use crate::domain::aggregate::Aggregator;
use crate::domain::config::{AggregationConfig, GatewayConfig};
use crate::domain::error::GatewayError;
use crate::domain::phase::{PhaseTracker, RequestPhase};
use crate::domain::types::{DcDmReply, DcDmRequest};
use crate::middleware::GatewayMetrics;
use crate::ports::{IdGenerator, LedgerContract, UuidGenerator};
use gl_01_record_store::StoreError;
use gl_02_record_lifecycle::{
    ContractFunction, GradientRecord, LifecycleError, QueryResult, TransactionRequest,
    TransactionResponse,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct AggregationService {
    contract: Arc<dyn LedgerContract>,
    ids: Arc<dyn IdGenerator>,
    aggregation: AggregationConfig,
    ledger_timeout: Duration,
    metrics: Arc<GatewayMetrics>,
}

impl AggregationService {
    pub fn new(contract: Arc<dyn LedgerContract>, config: &GatewayConfig) -> Self {
        Self {
            contract,
            ids: Arc::new(UuidGenerator),
            aggregation: config.aggregation.clone(),
            ledger_timeout: config.timeouts.ledger,
            metrics: Arc::new(GatewayMetrics::new()),
        }
    }

    /// Replace the record id source.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Share a metrics registry with the HTTP layer.
    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn aggregation(&self) -> &AggregationConfig {
        &self.aggregation
    }

    /// Create, query the epoch, reduce.
    ///
    /// Any failure aborts the request; no partial reply is ever produced.
    pub async fn send_dc_dm(&self, request: DcDmRequest) -> Result<DcDmReply, GatewayError> {
        let record_id = self.ids.next_id();
        let mut tracker = PhaseTracker::new(record_id.clone());

        tracker.advance();
        let create = TransactionRequest::submit(
            ContractFunction::CreateRecord.name(),
            [
                record_id.as_str(),
                request.value_a.as_str(),
                request.value_b.as_str(),
                request.epoch_id.as_str(),
            ],
        );
        if let Err(e) = self.call(&create).await {
            return Err(self.abort(&mut tracker, e));
        }
        self.metrics.record_created();
        debug!(record_id = %record_id, epoch_id = %request.epoch_id, "[gl-03] record created");

        tracker.advance();
        let query = TransactionRequest::evaluate(
            ContractFunction::QueryRecordByEpochId.name(),
            [request.epoch_id.as_str()],
        );
        let results: Vec<QueryResult> = match self
            .call(&query)
            .await
            .and_then(|response| response.decode(&request.epoch_id))
        {
            Ok(results) => results,
            Err(e) => return Err(self.abort(&mut tracker, e)),
        };

        tracker.advance();
        let mut aggregator =
            Aggregator::new(self.aggregation.revoked_policy, &self.aggregation.separator);
        for result in &results {
            aggregator.push(result);
        }
        let skipped = aggregator.skipped();
        let reply = aggregator.finish();

        tracker.advance();
        self.metrics.record_replied();
        info!(
            record_id = %record_id,
            epoch_id = %request.epoch_id,
            count = %reply.count,
            skipped_revoked = skipped,
            "[gl-03] 📊 epoch aggregated"
        );
        Ok(reply)
    }

    pub async fn revoke_gradients(&self, record_id: &str) -> Result<(), GatewayError> {
        let request =
            TransactionRequest::submit(ContractFunction::RevokeGradients.name(), [record_id]);
        self.call(&request).await?;
        info!(record_id = %record_id, "[gl-03] gradients revoked");
        Ok(())
    }

    pub async fn query_record(&self, record_id: &str) -> Result<GradientRecord, GatewayError> {
        let request =
            TransactionRequest::evaluate(ContractFunction::QueryRecord.name(), [record_id]);
        Ok(self.call(&request).await?.decode(record_id)?)
    }

    pub async fn query_records_by_epoch(
        &self,
        epoch_id: &str,
    ) -> Result<Vec<QueryResult>, GatewayError> {
        let request = TransactionRequest::evaluate(
            ContractFunction::QueryRecordByEpochId.name(),
            [epoch_id],
        );
        Ok(self.call(&request).await?.decode(epoch_id)?)
    }

    pub async fn query_all_records(&self) -> Result<Vec<QueryResult>, GatewayError> {
        let request = TransactionRequest::evaluate(
            ContractFunction::QueryAllRecords.name(),
            std::iter::empty::<String>(),
        );
        Ok(self.call(&request).await?.decode("all records")?)
    }

    /// One ledger call, bounded by the ledger timeout.
    async fn call(&self, request: &TransactionRequest) -> Result<TransactionResponse, LifecycleError> {
        match tokio::time::timeout(self.ledger_timeout, self.contract.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(LifecycleError::Store(StoreError::unavailable(format!(
                "{} timed out after {:?}",
                request.function, self.ledger_timeout
            )))),
        }
    }

    fn abort(&self, tracker: &mut PhaseTracker, source: LifecycleError) -> GatewayError {
        let phase = tracker.fail();
        self.metrics.record_phase_failure(phase);
        warn!(phase = %phase, error = %source, "[gl-03] SendDcDm failed");
        GatewayError::Aggregation { phase, source }
    }
}

impl std::fmt::Debug for AggregationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationService")
            .field("aggregation", &self.aggregation)
            .field("ledger_timeout", &self.ledger_timeout)
            .finish_non_exhaustive()
    }
}

/// Phase a failed `SendDcDm` stopped in, if the error came from one.
pub fn failed_phase(error: &GatewayError) -> Option<RequestPhase> {
    match error {
        GatewayError::Aggregation { phase, .. } => Some(*phase),
        _ => None,
    }
}
