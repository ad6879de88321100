//! # Inbound Ports (Driving Ports)
//!
//! Public API exposed by the Record Lifecycle subsystem.

use crate::domain::entities::{GradientRecord, QueryResult};
use crate::domain::errors::LifecycleError;

/// Primary API for the Record Lifecycle subsystem.
///
/// All operations are stateless over the backing store.
pub trait RecordLifecycleApi: Send + Sync {
    /// Write the bootstrap records `REC0..REC4` (epoch `-1`).
    ///
    /// Re-running overwrites the same keys without checking for them first.
    fn init_ledger(&self) -> Result<(), LifecycleError>;

    /// Write a record with `revoked = false`.
    ///
    /// An existing id is overwritten (upsert). If that record was already
    /// revoked it stays revoked.
    fn create_record(
        &self,
        record_id: &str,
        dm_value: &str,
        dc_value: &str,
        epoch_id: &str,
    ) -> Result<(), LifecycleError>;

    /// ## Returns
    ///
    /// - `Err(NotExists)`: id was never written
    /// - `Err(Decode)`: stored bytes are not a gradient record
    fn query_record(&self, record_id: &str) -> Result<GradientRecord, LifecycleError>;

    /// Flip `revoked` to `true`. Idempotent.
    ///
    /// Fails with `NotExists` without writing if the id is unknown, and with
    /// a retryable `WriteConflict` if another writer got there first.
    fn revoke_gradients(&self, record_id: &str) -> Result<(), LifecycleError>;

    /// Every record in key order.
    fn query_all_records(&self) -> Result<Vec<QueryResult>, LifecycleError>;

    /// Records whose `epochid` equals `epoch_id`, in key order.
    fn query_records_by_epoch(&self, epoch_id: &str) -> Result<Vec<QueryResult>, LifecycleError>;
}
