//! JSON-RPC method registry.

/// Method metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    /// Full method name (e.g., "gradients_sendDcDm")
    pub name: &'static str,
    /// Whether the method submits a ledger transaction
    pub is_write: bool,
}

pub const SEND_DC_DM: &str = "gradients_sendDcDm";
pub const REVOKE_GRADIENTS: &str = "gradients_revokeGradients";
pub const QUERY_RECORD: &str = "gradients_queryRecord";
pub const QUERY_RECORDS_BY_EPOCH: &str = "gradients_queryRecordsByEpoch";
pub const QUERY_ALL_RECORDS: &str = "gradients_queryAllRecords";

pub const METHODS: [MethodInfo; 5] = [
    MethodInfo { name: SEND_DC_DM, is_write: true },
    MethodInfo { name: REVOKE_GRADIENTS, is_write: true },
    MethodInfo { name: QUERY_RECORD, is_write: false },
    MethodInfo { name: QUERY_RECORDS_BY_EPOCH, is_write: false },
    MethodInfo { name: QUERY_ALL_RECORDS, is_write: false },
];

pub fn get_method_info(method: &str) -> Option<&'static MethodInfo> {
    METHODS.iter().find(|m| m.name == method)
}

/// Unknown methods count as reads.
pub fn is_write(method: &str) -> bool {
    get_method_info(method).is_some_and(|m| m.is_write)
}
