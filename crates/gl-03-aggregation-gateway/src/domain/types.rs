//! RPC request and reply records.

use serde::{Deserialize, Serialize};

/// `SendDcDm` input. `valueA`/`valueB` are stored as `dmvalue`/`dcvalue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcDmRequest {
    #[serde(alias = "dm")]
    pub value_a: String,
    #[serde(alias = "dc")]
    pub value_b: String,
    #[serde(alias = "epochID")]
    pub epoch_id: String,
}

impl DcDmRequest {
    pub fn new(
        value_a: impl Into<String>,
        value_b: impl Into<String>,
        epoch_id: impl Into<String>,
    ) -> Self {
        Self {
            value_a: value_a.into(),
            value_b: value_b.into(),
            epoch_id: epoch_id.into(),
        }
    }
}

/// `SendDcDm` output. `count` is a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcDmReply {
    pub aggregated_a: String,
    pub aggregated_b: String,
    pub count: String,
}

impl DcDmReply {
    /// Parsed `count`, for callers that want a number.
    pub fn count(&self) -> Option<usize> {
        self.count.parse().ok()
    }
}

/// Params of the single-id methods (`queryRecord`, `revokeGradients`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIdParam {
    #[serde(alias = "recordID", alias = "id")]
    pub record_id: String,
}

/// Params of `queryRecordsByEpoch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochParam {
    #[serde(alias = "epochID")]
    pub epoch_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_proto_names() {
        let canonical: DcDmRequest =
            serde_json::from_str(r#"{"valueA":"0.5","valueB":"0.1","epochId":"7"}"#).unwrap();
        let proto: DcDmRequest =
            serde_json::from_str(r#"{"dm":"0.5","dc":"0.1","epochID":"7"}"#).unwrap();
        assert_eq!(canonical, proto);
        assert_eq!(canonical, DcDmRequest::new("0.5", "0.1", "7"));
    }

    #[test]
    fn test_reply_wire_names() {
        let reply = DcDmReply {
            aggregated_a: "0.5, 0.6".into(),
            aggregated_b: "0.1, 0.2".into(),
            count: "2".into(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["aggregatedA"], "0.5, 0.6");
        assert_eq!(json["aggregatedB"], "0.1, 0.2");
        assert_eq!(json["count"], "2");
        assert_eq!(reply.count(), Some(2));
    }

    #[test]
    fn test_missing_field_rejected() {
        let parsed: Result<DcDmRequest, _> = serde_json::from_str(r#"{"valueA":"0.5"}"#);
        assert!(parsed.is_err());
    }
}
