use thiserror::Error;

use utxo_data_structures::{
    amount::Amount,
    chain::{Hash, OwnerId},
    error::TransactionError,
};
use utxo_storage::composite_key::CompositeKeyError;

/// Errors returned by the ledger operations.
///
/// Every variant but `StorageUnavailable` and `Corrupted` is raised before any state is touched,
/// so the failed call can be retried safely.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unauthorized: transaction belongs to {owner}, not to the caller {caller}")]
    Unauthorized { owner: OwnerId, caller: OwnerId },
    #[error("{0} not found")]
    NotFound(String),
    #[error("transaction {0} is already spent")]
    AlreadySpent(Hash),
    #[error("insufficient funds: inputs sum {inputs} but output is {output}")]
    InsufficientFunds { inputs: Amount, output: Amount },
    #[error("entry {key} holds an unrecognized value: {value}")]
    Corrupted { key: String, value: String },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(anyhow::Error),
    #[error("no caller identity could be resolved")]
    Unauthenticated,
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        LedgerError::StorageUnavailable(err)
    }
}

impl From<CompositeKeyError> for LedgerError {
    fn from(err: CompositeKeyError) -> Self {
        LedgerError::StorageUnavailable(err.into())
    }
}

impl From<TransactionError> for LedgerError {
    fn from(err: TransactionError) -> Self {
        LedgerError::InvalidArgument(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for LedgerError {
    fn from(_err: std::sync::PoisonError<T>) -> Self {
        LedgerError::StorageUnavailable(anyhow::anyhow!("ledger writer lock poisoned"))
    }
}
