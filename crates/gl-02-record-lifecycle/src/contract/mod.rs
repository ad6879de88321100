//! # Gradients Contract
//!
//! Named-transaction surface over the lifecycle service. Clients address
//! operations by function name with string arguments and receive a JSON
//! payload back, the same shape a ledger peer exposes to its gateway.
//!
//! | Function | Args | Kind | Payload |
//! |----------|------|------|---------|
//! | `InitLedger` | - | write | empty |
//! | `CreateRecord` | id, dm, dc, epoch | write | empty |
//! | `QueryRecord` | id | read | `GradientRecord` |
//! | `RevokeGradients` | id | write | empty |
//! | `QueryAllRecords` | - | read | `[QueryResult]` |
//! | `QueryRecordByEpochID` | epoch | read | `[QueryResult]` |

mod dispatcher;
mod transaction;

pub use dispatcher::GradientsContract;
pub use transaction::{ContractFunction, TransactionKind, TransactionRequest, TransactionResponse};
