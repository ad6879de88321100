//! # Record Codec
//!
//! JSON mapping between `GradientRecord` and store bytes.

use crate::domain::entities::GradientRecord;
use crate::domain::errors::LifecycleError;
use gl_01_record_store::StoreError;

pub fn encode_record(record: &GradientRecord) -> Result<Vec<u8>, LifecycleError> {
    serde_json::to_vec(record).map_err(|e| {
        LifecycleError::Store(StoreError::Serialization {
            message: e.to_string(),
        })
    })
}

/// Unknown fields are ignored; a missing required field is an error.
pub fn decode_record(key: &str, bytes: &[u8]) -> Result<GradientRecord, LifecycleError> {
    serde_json::from_slice(bytes).map_err(|e| LifecycleError::Decode {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_layout() {
        let bytes = encode_record(&GradientRecord::new("0.5", "0.1", "7")).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"dmvalue":"0.5","dcvalue":"0.1","epochid":"7","revoked":false}"#
        );
    }

    #[test]
    fn test_revoked_defaults_false_and_extras_ignored() {
        let record = decode_record(
            "REC0",
            br#"{"dmvalue":"0.5","dcvalue":"0.1","epochid":"7","owner":"org1"}"#,
        )
        .unwrap();
        assert!(!record.revoked);
        assert_eq!(record.epoch_id, "7");
    }

    #[test]
    fn test_missing_required_field() {
        for raw in [
            &br#"{"dcvalue":"0.1","epochid":"7"}"#[..],
            &br#"{"dmvalue":"0.5","epochid":"7"}"#[..],
            &br#"{"dmvalue":"0.5","dcvalue":"0.1"}"#[..],
            &b"not json"[..],
        ] {
            let err = decode_record("REC0", raw).unwrap_err();
            assert!(matches!(err, LifecycleError::Decode { ref key, .. } if key == "REC0"));
        }
    }
}
