//! # Ledger Handle
//!
//! Opens the configured store backend and deploys the gradients contract
//! on top of it.

use std::sync::Arc;

use gl_01_record_store::{FileBackedLedger, InMemoryLedger, LedgerStore, StoreError};
use gl_02_record_lifecycle::{
    ContractFunction, GradientsContract, LifecycleError, RecordLifecycleService,
    TransactionRequest,
};
use tracing::{info, instrument};

use crate::adapters::contract::DeployedContract;
use crate::container::config::{StorageBackend, StorageConfig};

/// Store plus the contract deployed on it.
pub struct LedgerHandle {
    store: Arc<dyn LedgerStore>,
    contract: Arc<DeployedContract>,
}

impl LedgerHandle {
    /// Open the configured backend. The file backend locks its data
    /// directory and verifies the write log before returning.
    #[instrument(skip(config), fields(backend = ?config.backend))]
    pub fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn LedgerStore> = match config.backend {
            StorageBackend::Memory => {
                info!("Opening in-memory ledger");
                Arc::new(InMemoryLedger::new(config.store_config()))
            }
            StorageBackend::File => {
                info!(data_dir = ?config.data_dir, "Opening file-backed ledger");
                Arc::new(FileBackedLedger::open(&config.data_dir, config.store_config())?)
            }
        };
        store.verify_write_log()?;
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: Arc<dyn LedgerStore>) -> Self {
        let api = RecordLifecycleService::new(Arc::clone(&store));
        Self {
            store,
            contract: Arc::new(GradientsContract::new(api)),
        }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn contract(&self) -> Arc<DeployedContract> {
        Arc::clone(&self.contract)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        let mut all = self.store.range_scan("", "")?;
        Ok(all.next().transpose()?.is_none())
    }

    /// Run `InitLedger` if the ledger holds no records. Returns whether it ran.
    pub fn seed_if_empty(&self) -> Result<bool, LifecycleError> {
        if !self.is_empty()? {
            info!("Ledger already populated, skipping InitLedger");
            return Ok(false);
        }
        let request = TransactionRequest::submit(
            ContractFunction::InitLedger.name(),
            std::iter::empty::<String>(),
        );
        self.contract.execute(&request)?;
        Ok(true)
    }
}
