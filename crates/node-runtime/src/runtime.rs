//! # Node Runtime
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Provision the client identity from the wallet
//! 3. Open the ledger (and seed it when empty, if configured)
//! 4. Deploy the in-process contract behind the gateway port
//! 5. Serve JSON-RPC until shutdown

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use gl_03_aggregation_gateway::GatewayServer;

use crate::adapters::{provision, AuthenticatedSession, InProcessContract};
use crate::container::{LedgerHandle, NodeConfig};

/// A fully wired node, ready to serve.
pub struct NodeRuntime {
    config: NodeConfig,
    session: AuthenticatedSession,
    ledger: LedgerHandle,
    server: GatewayServer,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate().context("Invalid node configuration")?;

        let session = provision(&config.identity).context("Failed to provision identity")?;

        let ledger = LedgerHandle::open(&config.storage).context("Failed to open ledger")?;
        if config.storage.init_ledger {
            let seeded = ledger
                .seed_if_empty()
                .context("Failed to initialise ledger")?;
            if seeded {
                info!("🌱 Ledger seeded with bootstrap records");
            }
        }

        let contract = InProcessContract::new(ledger.contract(), session.clone());
        let server = GatewayServer::new(config.gateway.clone(), Arc::new(contract))
            .context("Failed to build gateway")?;

        Ok(Self {
            config,
            session,
            ledger,
            server,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn session(&self) -> &AuthenticatedSession {
        &self.session
    }

    pub fn ledger(&self) -> &LedgerHandle {
        &self.ledger
    }

    pub fn server(&self) -> &GatewayServer {
        &self.server
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self
            .server
            .bind()
            .await
            .context("Failed to bind gateway address")?;
        self.run_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn run_on<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("===========================================");
        info!("  Gradient Ledger Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!("Identity: {} ({})", self.session.label, self.session.identity.msp_id);
        info!("Channel:  {} / {}", self.session.channel, self.session.contract);
        info!("Storage:  {:?}", self.config.storage.backend);

        self.server
            .serve(listener, shutdown)
            .await
            .context("Gateway server failed")?;

        info!("Shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::StorageBackend;
    use gl_02_record_lifecycle::{RecordLifecycleApi, SEED_RECORD_COUNT};

    fn credentials(root: &std::path::Path) -> std::path::PathBuf {
        let dir = root.join("creds");
        std::fs::create_dir_all(dir.join("signcerts")).unwrap();
        std::fs::create_dir_all(dir.join("keystore")).unwrap();
        std::fs::write(dir.join("signcerts/cert.pem"), "cert").unwrap();
        std::fs::write(dir.join("keystore/key_sk"), "key").unwrap();
        dir
    }

    #[test]
    fn test_wires_node() {
        let root = tempfile::tempdir().unwrap();
        let mut config = NodeConfig::default();
        config.identity.wallet_dir = root.path().join("wallet");
        config.identity.credential_dir = Some(credentials(root.path()));
        config.storage.backend = StorageBackend::File;
        config.storage.data_dir = root.path().join("data");

        let node = NodeRuntime::new(config).unwrap();
        assert_eq!(node.session().label, "appUser");
        let all = node.ledger().contract().api().query_all_records().unwrap();
        assert_eq!(all.len(), SEED_RECORD_COUNT);
    }

    #[test]
    fn test_missing_identity_fails_startup() {
        let root = tempfile::tempdir().unwrap();
        let mut config = NodeConfig::default();
        config.identity.wallet_dir = root.path().join("wallet");

        let err = NodeRuntime::new(config).err().unwrap();
        assert!(format!("{err:#}").contains("identity"));
    }
}
