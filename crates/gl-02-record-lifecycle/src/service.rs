//! # Record Lifecycle Service
//!
//! Implements `RecordLifecycleApi` over any `LedgerStore`.

use crate::domain::codec::{decode_record, encode_record};
use crate::domain::entities::{GradientRecord, QueryResult};
use crate::domain::errors::LifecycleError;
use crate::ports::inbound::RecordLifecycleApi;
use gl_01_record_store::{LedgerStore, Selector, StateQueryIterator, StoreError};
use std::sync::Arc;

/// Field the epoch selector is evaluated against.
const EPOCH_FIELD: &str = "epochid";

pub struct RecordLifecycleService<S: LedgerStore + ?Sized> {
    store: Arc<S>,
}

impl<S: LedgerStore + ?Sized> Clone for RecordLifecycleService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore + ?Sized> RecordLifecycleService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Versioned upsert that never clears an existing revocation.
    fn upsert(&self, record_id: &str, mut record: GradientRecord) -> Result<(), LifecycleError> {
        let expected = match self.store.get_versioned(record_id) {
            Ok(current) => {
                // An undecodable predecessor carries no revocation to keep.
                if let Ok(previous) = decode_record(record_id, &current.value) {
                    record.revoked |= previous.revoked;
                }
                Some(current.version)
            }
            Err(StoreError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        let bytes = encode_record(&record)?;
        self.store.put_if_version(record_id, &bytes, expected)?;
        Ok(())
    }

    /// Drain a scoped iterator into decoded results.
    ///
    /// Returning early drops the iterator, which releases its cursor. The
    /// whole result set is held in memory: nothing is returned until every
    /// entry has decoded.
    fn collect(iter: StateQueryIterator) -> Result<Vec<QueryResult>, LifecycleError> {
        let mut results = Vec::new();
        for item in iter {
            let kv = item?;
            let record = decode_record(&kv.key, &kv.value)?;
            results.push(QueryResult {
                key: kv.key,
                record,
            });
        }
        Ok(results)
    }
}

impl<S: LedgerStore + ?Sized> RecordLifecycleApi for RecordLifecycleService<S> {
    fn init_ledger(&self) -> Result<(), LifecycleError> {
        for (record_id, record) in GradientRecord::seed() {
            self.upsert(&record_id, record)?;
            tracing::debug!(record_id = %record_id, "[gl-02] seed record written");
        }
        tracing::info!("[gl-02] 🌱 Ledger initialised with bootstrap records");
        Ok(())
    }

    fn create_record(
        &self,
        record_id: &str,
        dm_value: &str,
        dc_value: &str,
        epoch_id: &str,
    ) -> Result<(), LifecycleError> {
        self.upsert(record_id, GradientRecord::new(dm_value, dc_value, epoch_id))?;
        tracing::info!(record_id, epoch_id, "[gl-02] record created");
        Ok(())
    }

    fn query_record(&self, record_id: &str) -> Result<GradientRecord, LifecycleError> {
        let bytes = self
            .store
            .get(record_id)
            .map_err(|e| LifecycleError::from_lookup(record_id, e))?;
        decode_record(record_id, &bytes)
    }

    fn revoke_gradients(&self, record_id: &str) -> Result<(), LifecycleError> {
        let current = self
            .store
            .get_versioned(record_id)
            .map_err(|e| LifecycleError::from_lookup(record_id, e))?;
        let mut record = decode_record(record_id, &current.value)?;

        if record.revoked {
            tracing::debug!(record_id, "[gl-02] record already revoked");
            return Ok(());
        }

        record.revoked = true;
        let bytes = encode_record(&record)?;
        self.store
            .put_if_version(record_id, &bytes, Some(current.version))?;
        tracing::info!(record_id, "[gl-02] 🚫 gradients revoked");
        Ok(())
    }

    fn query_all_records(&self) -> Result<Vec<QueryResult>, LifecycleError> {
        Self::collect(self.store.range_scan("", "")?)
    }

    fn query_records_by_epoch(&self, epoch_id: &str) -> Result<Vec<QueryResult>, LifecycleError> {
        let selector = Selector::eq(EPOCH_FIELD, epoch_id);
        Self::collect(self.store.query_by_predicate(&selector)?)
    }
}
