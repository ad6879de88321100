//! Routes named transactions to `RecordLifecycleApi`.

use super::transaction::{ContractFunction, TransactionKind, TransactionRequest, TransactionResponse};
use crate::domain::errors::LifecycleError;
use crate::ports::inbound::RecordLifecycleApi;

pub struct GradientsContract<A> {
    api: A,
}

impl<A: RecordLifecycleApi> GradientsContract<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Execute one transaction.
    ///
    /// ## Errors
    ///
    /// - `Validation`: unknown function, wrong argument count, or a write
    ///   function sent as an evaluate
    /// - anything the lifecycle operation itself returns
    pub fn execute(&self, request: &TransactionRequest) -> Result<TransactionResponse, LifecycleError> {
        let function = ContractFunction::parse(&request.function).ok_or_else(|| {
            LifecycleError::validation(format!("unknown function: {}", request.function))
        })?;

        if request.args.len() != function.arity() {
            return Err(LifecycleError::validation(format!(
                "{function} expects {} argument(s), got {}",
                function.arity(),
                request.args.len()
            )));
        }

        if request.kind == TransactionKind::Evaluate && function.is_write() {
            return Err(LifecycleError::validation(format!(
                "{function} modifies the ledger and must be submitted"
            )));
        }

        tracing::debug!(
            function = function.name(),
            kind = ?request.kind,
            "[gl-02] executing transaction"
        );

        let args = &request.args;
        match function {
            ContractFunction::InitLedger => {
                self.api.init_ledger()?;
                Ok(TransactionResponse::empty())
            }
            ContractFunction::CreateRecord => {
                self.api.create_record(&args[0], &args[1], &args[2], &args[3])?;
                Ok(TransactionResponse::empty())
            }
            ContractFunction::QueryRecord => {
                TransactionResponse::json(&self.api.query_record(&args[0])?)
            }
            ContractFunction::RevokeGradients => {
                self.api.revoke_gradients(&args[0])?;
                Ok(TransactionResponse::empty())
            }
            ContractFunction::QueryAllRecords => {
                TransactionResponse::json(&self.api.query_all_records()?)
            }
            ContractFunction::QueryRecordByEpochId => {
                TransactionResponse::json(&self.api.query_records_by_epoch(&args[0])?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{GradientRecord, QueryResult};
    use crate::service::RecordLifecycleService;
    use gl_01_record_store::InMemoryLedger;
    use std::sync::Arc;

    fn contract() -> GradientsContract<RecordLifecycleService<InMemoryLedger>> {
        GradientsContract::new(RecordLifecycleService::new(Arc::new(
            InMemoryLedger::default(),
        )))
    }

    #[test]
    fn test_create_then_evaluate_by_epoch() {
        let contract = contract();
        let created = contract
            .execute(&TransactionRequest::submit(
                "createRecord",
                ["id-1", "0.5", "0.1", "7"],
            ))
            .unwrap();
        assert!(created.is_empty());

        let response = contract
            .execute(&TransactionRequest::evaluate("queryRecordByEpochID", ["7"]))
            .unwrap();
        let results: Vec<QueryResult> = response.decode("queryRecordByEpochID").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "id-1");
        assert_eq!(results[0].record, GradientRecord::new("0.5", "0.1", "7"));
    }

    #[test]
    fn test_query_record_payload() {
        let contract = contract();
        contract
            .execute(&TransactionRequest::submit("InitLedger", Vec::<String>::new()))
            .unwrap();
        let response = contract
            .execute(&TransactionRequest::evaluate("QueryRecord", ["REC3"]))
            .unwrap();
        let record: GradientRecord = response.decode("QueryRecord").unwrap();
        assert_eq!(record.dm_value, "0.23");
    }

    #[test]
    fn test_revoke_via_submit() {
        let contract = contract();
        contract
            .execute(&TransactionRequest::submit("createRecord", ["r", "1", "2", "7"]))
            .unwrap();
        contract
            .execute(&TransactionRequest::submit("revokeGradients", ["r"]))
            .unwrap();
        assert!(contract.api().query_record("r").unwrap().revoked);
    }

    #[test]
    fn test_validation_failures() {
        let contract = contract();

        let unknown = contract.execute(&TransactionRequest::submit("deleteRecord", ["r"]));
        assert!(matches!(unknown, Err(LifecycleError::Validation { .. })));

        let arity = contract.execute(&TransactionRequest::submit("createRecord", ["r", "1"]));
        assert!(matches!(arity, Err(LifecycleError::Validation { .. })));

        let read_only = contract.execute(&TransactionRequest::evaluate(
            "createRecord",
            ["r", "1", "2", "7"],
        ));
        assert!(matches!(read_only, Err(LifecycleError::Validation { .. })));
        assert!(matches!(
            contract.api().query_record("r"),
            Err(LifecycleError::NotExists { .. })
        ));
    }

    #[test]
    fn test_lifecycle_errors_pass_through() {
        let contract = contract();
        let err = contract
            .execute(&TransactionRequest::evaluate("queryRecord", ["missing"]))
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::NotExists {
                record_id: "missing".into()
            }
        );
    }
}
