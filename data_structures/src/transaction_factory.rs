use crate::{
    amount::Amount,
    chain::{Hashable, Input, OwnerId, Transaction},
    error::TransactionError,
};

/// Build the genesis transaction that mints `fee` to `output`.
///
/// Negative fees and empty owners are unrepresentable: they are rejected when parsing an
/// `Amount` or an `OwnerId`.
pub fn make_genesis(output: OwnerId, fee: Amount) -> Transaction {
    Transaction::coinbase(output, fee)
}

/// Build a candidate transaction that sends `output_fee` to `output`, consuming `input_txs`.
///
/// Returns the candidate along with the expected change. The change is informative only: the
/// ledger recomputes it from the stored inputs when the spend is submitted.
pub fn make_spend(
    output: OwnerId,
    output_fee: Amount,
    input_txs: &[Transaction],
) -> Result<(Transaction, Amount), TransactionError> {
    if input_txs.is_empty() {
        return Err(TransactionError::NoInputs);
    }

    let inputs_sum = input_txs.iter().try_fold(Amount::default(), |acc, tx| {
        acc.checked_add(tx.fee)
            .ok_or(TransactionError::InputValueOverflow)
    })?;

    let change = inputs_sum
        .checked_sub(output_fee)
        .ok_or(TransactionError::InsufficientInputs {
            inputs: inputs_sum,
            output: output_fee,
        })?;

    let candidate = Transaction {
        inputs: input_txs
            .iter()
            .map(|tx| Input::Transaction(tx.hash()))
            .collect(),
        output,
        fee: output_fee,
    };

    Ok((candidate, change))
}
