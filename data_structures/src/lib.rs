#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

/// Module containing the fixed-point `Amount` value type
pub mod amount;

/// Module containing the ledger's chain data types
pub mod chain;

/// Module containing error definitions
pub mod error;

/// Module containing the functions used by clients to build new transactions
pub mod transaction_factory;

/// Serialization boilerplate to allow serializing some data structures as
/// strings or bytes depending on the serializer.
mod serialization_helpers;
