//! Ledger core: tracks ownership of value as a graph of transactions, prevents double-spending,
//! mints change and answers ownership queries on top of a generic key/value `Storage`.

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

pub mod error;
pub mod identity;
pub mod index;
pub mod invocation;
pub mod keys;
pub mod ledger;
pub mod query;

pub use error::LedgerError;
pub use ledger::Ledger;

/// Result type used by the ledger
pub type Result<T> = std::result::Result<T, LedgerError>;
