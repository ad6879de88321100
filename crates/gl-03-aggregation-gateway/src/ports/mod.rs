pub mod outbound;

pub use outbound::{IdGenerator, LedgerContract, UuidGenerator};
