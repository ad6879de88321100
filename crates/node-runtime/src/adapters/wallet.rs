//! # Filesystem Wallet
//!
//! Client identities stored as `<wallet_dir>/<label>.id`, one JSON object
//! per file. On first start an identity is imported from a credential
//! directory laid out as:
//!
//! ```text
//! <credential_dir>/
//!   signcerts/cert.pem
//!   keystore/<exactly one private key file>
//! ```

use crate::container::config::IdentityConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const IDENTITY_EXTENSION: &str = "id";

/// X.509 identity as stored in the wallet.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct X509Identity {
    pub msp_id: String,
    pub certificate: String,
    pub private_key: String,
}

impl fmt::Debug for X509Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X509Identity")
            .field("msp_id", &self.msp_id)
            .field("certificate_len", &self.certificate.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet I/O error at {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("identity '{label}' is corrupt: {message}")]
    Corrupt { label: String, message: String },

    #[error("identity '{label}' not in wallet and no credential directory configured")]
    MissingIdentity { label: String },

    #[error("invalid credentials: {0}")]
    Credentials(String),
}

fn io_error(path: &Path, e: std::io::Error) -> WalletError {
    WalletError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Directory of `<label>.id` files.
#[derive(Debug, Clone)]
pub struct FileSystemWallet {
    dir: PathBuf,
}

impl FileSystemWallet {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, WalletError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        Ok(Self { dir })
    }

    fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.{IDENTITY_EXTENSION}"))
    }

    pub fn exists(&self, label: &str) -> bool {
        self.path_for(label).is_file()
    }

    pub fn get(&self, label: &str) -> Result<X509Identity, WalletError> {
        let path = self.path_for(label);
        let raw = std::fs::read(&path).map_err(|e| io_error(&path, e))?;
        serde_json::from_slice(&raw).map_err(|e| WalletError::Corrupt {
            label: label.to_string(),
            message: e.to_string(),
        })
    }

    /// Store an identity: write to a temp file, sync, rename into place.
    pub fn put(&self, label: &str, identity: &X509Identity) -> Result<(), WalletError> {
        let path = self.path_for(label);
        let tmp = path.with_extension("id.tmp");
        let bytes = serde_json::to_vec_pretty(identity).map_err(|e| WalletError::Corrupt {
            label: label.to_string(),
            message: e.to_string(),
        })?;

        let mut file = std::fs::File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
        file.write_all(&bytes).map_err(|e| io_error(&tmp, e))?;
        file.sync_all().map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;
        Ok(())
    }

    /// Labels of every stored identity, sorted.
    pub fn labels(&self) -> Result<Vec<String>, WalletError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let mut labels: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == IDENTITY_EXTENSION))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        labels.sort();
        Ok(labels)
    }
}

/// Read `signcerts/cert.pem` and the single key under `keystore/`.
pub fn import_credentials(
    credential_dir: &Path,
    msp_id: &str,
) -> Result<X509Identity, WalletError> {
    let cert_path = credential_dir.join("signcerts").join("cert.pem");
    let certificate =
        std::fs::read_to_string(&cert_path).map_err(|e| io_error(&cert_path, e))?;

    let key_dir = credential_dir.join("keystore");
    let keys: Vec<PathBuf> = std::fs::read_dir(&key_dir)
        .map_err(|e| io_error(&key_dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    let key_path = match keys.as_slice() {
        [only] => only,
        _ => {
            return Err(WalletError::Credentials(format!(
                "keystore {key_dir:?} must contain exactly one file, found {}",
                keys.len()
            )))
        }
    };
    let private_key = std::fs::read_to_string(key_path).map_err(|e| io_error(key_path, e))?;

    Ok(X509Identity {
        msp_id: msp_id.to_string(),
        certificate,
        private_key,
    })
}

/// The identity plus the channel and contract every call goes to.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub label: String,
    pub identity: X509Identity,
    pub channel: String,
    pub contract: String,
}

/// Reuse the wallet entry for the configured label, importing it once from
/// the credential directory when absent.
pub fn provision(config: &IdentityConfig) -> Result<AuthenticatedSession, WalletError> {
    let wallet = FileSystemWallet::open(&config.wallet_dir)?;

    let identity = if wallet.exists(&config.label) {
        let identity = wallet.get(&config.label)?;
        info!(label = %config.label, msp_id = %identity.msp_id, "Using stored identity");
        identity
    } else {
        let credential_dir =
            config
                .credential_dir
                .as_ref()
                .ok_or_else(|| WalletError::MissingIdentity {
                    label: config.label.clone(),
                })?;
        let identity = import_credentials(credential_dir, &config.msp_id)?;
        wallet.put(&config.label, &identity)?;
        info!(
            label = %config.label,
            msp_id = %identity.msp_id,
            "🔑 Imported identity into wallet"
        );
        identity
    };

    Ok(AuthenticatedSession {
        label: config.label.clone(),
        identity,
        channel: config.channel.clone(),
        contract: config.contract.clone(),
    })
}
