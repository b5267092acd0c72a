//! Composite keys used by the ledger in the underlying `Storage`.
use utxo_data_structures::chain::{Hash, Input, OwnerId};
use utxo_storage::composite_key::{self, CompositeKeyError};

/// Namespace of the spent-state index, keyed by `(owner, transaction id)`
pub const SPENT_STATE_INDEX: &str = "output~txid";

/// Namespace of the transaction bodies, keyed by transaction id
pub const TRANSACTIONS: &str = "tx";

/// The body of the transaction referenced by an input.
///
/// `CoinBase` maps to its own literal key, which never holds a transaction.
#[inline]
pub fn transaction(input: &Input) -> Result<Vec<u8>, CompositeKeyError> {
    composite_key::encode(TRANSACTIONS, &[input.to_string()])
}

/// The body of the transaction with the given id.
#[inline]
pub fn transaction_by_id(tx_id: &Hash) -> Result<Vec<u8>, CompositeKeyError> {
    transaction(&Input::Transaction(*tx_id))
}

/// The spent-state entry of a transaction owned by `owner`.
#[inline]
pub fn spent_state(owner: &OwnerId, tx_id: &Hash) -> Result<Vec<u8>, CompositeKeyError> {
    composite_key::encode(SPENT_STATE_INDEX, &[owner.to_string(), tx_id.to_string()])
}

/// Prefix shared by all the spent-state entries of `owner`.
#[inline]
pub fn spent_state_prefix(owner: &OwnerId) -> Result<Vec<u8>, CompositeKeyError> {
    composite_key::encode(SPENT_STATE_INDEX, &[owner.to_string()])
}
