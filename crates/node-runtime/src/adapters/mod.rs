//! # Adapter Implementations
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  OUTER LAYER (Adapters)                      │
//! │   FileSystemWallet ──→ AuthenticatedSession                  │
//! │   InProcessContract (implements gl-03 LedgerContract)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod contract;
pub mod wallet;

pub use contract::{DeployedContract, InProcessContract, LedgerApi};
pub use wallet::{
    import_credentials, provision, AuthenticatedSession, FileSystemWallet, WalletError,
    X509Identity,
};
