//! # Core Entities

use serde::{Deserialize, Serialize};

/// Epoch tag of bootstrap records that belong to no training round.
pub const SEED_EPOCH: &str = "-1";

/// Number of bootstrap records written by `InitLedger` (`REC0..REC4`).
pub const SEED_RECORD_COUNT: usize = 5;

/// One gradient contribution as stored in the ledger.
///
/// Wire form: `{"dmvalue":"0.5","dcvalue":"0.1","epochid":"7","revoked":false}`.
/// The values are opaque strings and are never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientRecord {
    #[serde(rename = "dmvalue")]
    pub dm_value: String,
    #[serde(rename = "dcvalue")]
    pub dc_value: String,
    #[serde(rename = "epochid")]
    pub epoch_id: String,
    #[serde(default)]
    pub revoked: bool,
}

impl GradientRecord {
    /// A fresh, unrevoked record.
    pub fn new(
        dm_value: impl Into<String>,
        dc_value: impl Into<String>,
        epoch_id: impl Into<String>,
    ) -> Self {
        Self {
            dm_value: dm_value.into(),
            dc_value: dc_value.into(),
            epoch_id: epoch_id.into(),
            revoked: false,
        }
    }

    /// Bootstrap records `REC0..REC4` with values `0.20..0.24`.
    pub fn seed() -> Vec<(String, GradientRecord)> {
        (0..SEED_RECORD_COUNT)
            .map(|i| {
                let value = format!("0.2{i}");
                (
                    format!("REC{i}"),
                    GradientRecord::new(value.clone(), value, SEED_EPOCH),
                )
            })
            .collect()
    }
}

/// Read-only pairing of a key with its decoded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub key: String,
    pub record: GradientRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_records() {
        let seed = GradientRecord::seed();
        assert_eq!(seed.len(), 5);
        assert_eq!(seed[0].0, "REC0");
        assert_eq!(seed[0].1.dm_value, "0.20");
        assert_eq!(seed[4].0, "REC4");
        assert_eq!(seed[4].1.dc_value, "0.24");
        assert!(seed
            .iter()
            .all(|(_, r)| r.epoch_id == SEED_EPOCH && !r.revoked));
    }

    #[test]
    fn test_query_result_wire_names() {
        let result = QueryResult {
            key: "REC1".into(),
            record: GradientRecord::new("0.5", "0.1", "7"),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["key"], "REC1");
        assert_eq!(json["record"]["dmvalue"], "0.5");
        assert_eq!(json["record"]["epochid"], "7");
        assert_eq!(json["record"]["revoked"], false);
    }
}
