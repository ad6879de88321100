//! # Value Objects
//!
//! Store configuration and write preconditions.

use crate::domain::entities::Version;
use serde::{Deserialize, Serialize};

/// Record fields kept in the secondary index by default.
pub const DEFAULT_INDEXED_FIELDS: &[&str] = &["epochid"];

/// Configuration for a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Top-level JSON fields maintained in the secondary index.
    ///
    /// Selectors on any other field fall back to a full scan.
    pub indexed_fields: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            indexed_fields: DEFAULT_INDEXED_FIELDS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl StoreConfig {
    /// Configuration with no secondary index at all.
    pub fn unindexed() -> Self {
        Self {
            indexed_fields: Vec::new(),
        }
    }
}

/// Precondition checked atomically with a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    /// Unconditional write.
    Always,
    /// Key must not exist yet.
    Absent,
    /// Key must currently be at exactly this version.
    Version(Version),
}

impl WriteCondition {
    /// Maps the `expected` argument of `put_if_version`.
    pub fn from_expected(expected: Option<Version>) -> Self {
        match expected {
            Some(v) => WriteCondition::Version(v),
            None => WriteCondition::Absent,
        }
    }

    pub fn expected(&self) -> Option<Version> {
        match self {
            WriteCondition::Version(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether a key at `current` satisfies the condition.
    pub fn holds(&self, current: Option<Version>) -> bool {
        match self {
            WriteCondition::Always => true,
            WriteCondition::Absent => current.is_none(),
            WriteCondition::Version(v) => current == Some(*v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_indexes_epoch() {
        let config = StoreConfig::default();
        assert_eq!(config.indexed_fields, vec!["epochid".to_string()]);
    }

    #[test]
    fn test_write_condition_holds() {
        assert!(WriteCondition::Always.holds(None));
        assert!(WriteCondition::Always.holds(Some(4)));

        assert!(WriteCondition::Absent.holds(None));
        assert!(!WriteCondition::Absent.holds(Some(1)));

        assert!(WriteCondition::Version(3).holds(Some(3)));
        assert!(!WriteCondition::Version(3).holds(Some(4)));
        assert!(!WriteCondition::Version(3).holds(None));
    }

    #[test]
    fn test_config_partial_deserialize() {
        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }
}
