pub mod aggregate;
pub mod config;
pub mod error;
pub mod methods;
pub mod phase;
pub mod types;
