//! Error type definitions for the data structure module.

use thiserror::Error;

use crate::{
    amount::{Amount, AmountParseError},
    chain::HashParseError,
};

/// Errors when building or decoding a transaction
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TransactionError {
    #[error("transaction has no inputs")]
    NoInputs,
    #[error("overflow when adding up the value of the inputs")]
    InputValueOverflow,
    #[error("inputs sum {inputs} is less than the output {output}")]
    InsufficientInputs { inputs: Amount, output: Amount },
    #[error("invalid amount: {0}")]
    Amount(#[from] AmountParseError),
    #[error("invalid identifier: {0}")]
    Identifier(#[from] HashParseError),
    #[error("malformed transaction: {0}")]
    Malformed(String),
}
