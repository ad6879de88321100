//! # Node Configuration
//!
//! Unified configuration for the ledger, the client identity and the
//! gateway. Every section has defaults; a JSON file named by `GL_CONFIG`
//! and `GL_*` environment variables override them in that order.

use gl_01_record_store::StoreConfig;
use gl_03_aggregation_gateway::{parse_duration, GatewayConfig, RevokedPolicy};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::info;

/// Complete node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Ledger storage.
    pub storage: StorageConfig,
    /// Client identity and ledger channel.
    pub identity: IdentityConfig,
    /// Aggregation Gateway.
    pub gateway: GatewayConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

impl NodeConfig {
    /// Read a JSON config file. Missing sections take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Defaults, then `GL_CONFIG`, then the remaining `GL_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`NodeConfig::load`] over an arbitrary variable source.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("GL_CONFIG") {
            Some(path) => {
                let config = Self::from_file(Path::new(&path))?;
                info!(path = %path, "Loaded configuration file");
                config
            }
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Apply `GL_*` overrides. An unrecognised value is rejected rather
    /// than silently leaving the default in place.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("GL_STORAGE_BACKEND") {
            self.storage.backend = match backend.as_str() {
                "memory" => StorageBackend::Memory,
                "file" => StorageBackend::File,
                other => {
                    return Err(invalid_override(
                        "GL_STORAGE_BACKEND",
                        other,
                        "expected 'memory' or 'file'",
                    ))
                }
            };
        }
        if let Some(dir) = lookup("GL_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        override_parsed(&lookup, "GL_INIT_LEDGER", &mut self.storage.init_ledger)?;

        if let Some(dir) = lookup("GL_WALLET_DIR") {
            self.identity.wallet_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("GL_CREDENTIAL_DIR") {
            self.identity.credential_dir = Some(PathBuf::from(dir));
        }
        override_string(&lookup, "GL_IDENTITY_LABEL", &mut self.identity.label);
        override_string(&lookup, "GL_MSP_ID", &mut self.identity.msp_id);
        override_string(&lookup, "GL_CHANNEL", &mut self.identity.channel);
        override_string(&lookup, "GL_CONTRACT", &mut self.identity.contract);

        override_parsed::<IpAddr, _>(&lookup, "GL_HTTP_HOST", &mut self.gateway.http.host)?;
        override_parsed(&lookup, "GL_HTTP_PORT", &mut self.gateway.http.port)?;
        override_parsed(&lookup, "GL_CORS_ENABLED", &mut self.gateway.cors.enabled)?;
        if let Some(separator) = lookup("GL_SEPARATOR") {
            self.gateway.aggregation.separator = separator;
        }
        if let Some(policy) = lookup("GL_REVOKED_POLICY") {
            self.gateway.aggregation.revoked_policy = match policy.as_str() {
                "include" => RevokedPolicy::Include,
                "exclude" => RevokedPolicy::Exclude,
                other => {
                    return Err(invalid_override(
                        "GL_REVOKED_POLICY",
                        other,
                        "expected 'include' or 'exclude'",
                    ))
                }
            };
        }
        if let Some(timeout) = lookup("GL_LEDGER_TIMEOUT") {
            self.gateway.timeouts.ledger = parse_duration(&timeout)
                .map_err(|e| invalid_override("GL_LEDGER_TIMEOUT", &timeout, e))?;
        }

        override_string(&lookup, "GL_LOG_LEVEL", &mut self.logging.level);
        override_parsed(&lookup, "GL_JSON_LOGS", &mut self.logging.json)?;
        Ok(())
    }

    /// Validate configuration before anything is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.identity.label.trim().is_empty() {
            return Err(ConfigError::Invalid("identity label cannot be empty".into()));
        }
        if self.identity.channel.is_empty() || self.identity.contract.is_empty() {
            return Err(ConfigError::Invalid(
                "channel and contract names cannot be empty".into(),
            ));
        }
        if self.storage.backend == StorageBackend::File
            && self.storage.data_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "file backend needs a data directory".into(),
            ));
        }
        Ok(())
    }
}

fn override_string<F>(lookup: &F, key: &str, target: &mut String)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *target = value;
    }
}

fn override_parsed<T, F>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .parse()
            .map_err(|e: T::Err| invalid_override(key, &raw, e))?;
    }
    Ok(())
}

fn invalid_override(key: &str, value: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid(format!("{key}={value:?}: {reason}"))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("cannot parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where the world state lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile, lost on exit.
    #[default]
    Memory,
    /// Snapshot and write log under `data_dir`.
    File,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Data directory for the file backend.
    pub data_dir: PathBuf,
    /// Record fields with a secondary index.
    pub indexed_fields: Vec<String>,
    /// Seed an empty ledger with the sample records at startup.
    pub init_ledger: bool,
}

impl StorageConfig {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            indexed_fields: self.indexed_fields.clone(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
            indexed_fields: StoreConfig::default().indexed_fields,
            init_ledger: true,
        }
    }
}

/// Client identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Directory holding `<label>.id` files.
    pub wallet_dir: PathBuf,
    /// Identity used for every ledger call.
    pub label: String,
    /// Membership service provider the identity belongs to.
    pub msp_id: String,
    /// `signcerts/` + `keystore/` directory to import from when the
    /// wallet has no entry for `label`.
    pub credential_dir: Option<PathBuf>,
    pub channel: String,
    pub contract: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            wallet_dir: PathBuf::from("./wallet"),
            label: "appUser".to_string(),
            msp_id: "Org1MSP".to_string(),
            credential_dir: None,
            channel: "mychannel".to_string(),
            contract: "gradients".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `gl_03_aggregation_gateway=debug`.
    pub level: String,
    /// One JSON object per line instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
