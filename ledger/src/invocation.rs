//! # Invocation dispatch
//!
//! Entry point used by the host: every call into the ledger is an `Invocation`, run on behalf of
//! the caller resolved by an `IdentityResolver`.
use utxo_data_structures::chain::Transaction;
use utxo_storage::storage::Storage;

use crate::{identity::IdentityResolver, query::Query, Ledger, LedgerError, Result};

/// Function name of the genesis invocation
pub const FUNCTION_GENESIS: &str = "init";
/// Function name of the spend invocation
pub const FUNCTION_SPEND: &str = "spend";
/// Function name of the query invocation
pub const FUNCTION_QUERY: &str = "query";

/// Call into the ledger
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Invocation {
    /// Register the genesis transaction, given as its JSON bytes
    Genesis(Vec<u8>),
    /// Spend a candidate transaction, given as its JSON bytes
    Spend(Vec<u8>),
    /// Read-only query
    Query(Query),
}

/// Successful result of an invocation
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Empty,
    Payload(Vec<u8>),
}

impl Response {
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Response::Empty => None,
            Response::Payload(bytes) => Some(bytes.as_slice()),
        }
    }
}

impl Invocation {
    /// Parse the positional arguments of a call, whose first argument is the function name:
    ///
    /// * `init <transaction>`
    /// * `spend <transaction>`
    /// * `query <mode> [transaction id]`
    pub fn from_args<T: AsRef<[u8]>>(args: &[T]) -> Result<Self> {
        let (function, args) = args
            .split_first()
            .ok_or_else(|| LedgerError::InvalidArgument("missing function name".to_string()))?;
        let function = utf8(function.as_ref())?;

        match (function, args) {
            (FUNCTION_GENESIS, [tx]) => Ok(Invocation::Genesis(tx.as_ref().to_vec())),
            (FUNCTION_SPEND, [tx]) => Ok(Invocation::Spend(tx.as_ref().to_vec())),
            (FUNCTION_QUERY, [mode]) => Query::from_mode(utf8(mode.as_ref())?, None).map(Invocation::Query),
            (FUNCTION_QUERY, [mode, tx_id]) => {
                Query::from_mode(utf8(mode.as_ref())?, Some(utf8(tx_id.as_ref())?))
                    .map(Invocation::Query)
            }
            (FUNCTION_GENESIS, _) | (FUNCTION_SPEND, _) | (FUNCTION_QUERY, _) => {
                Err(LedgerError::InvalidArgument(format!(
                    "incorrect number of arguments for {}: {}",
                    function,
                    args.len()
                )))
            }
            _ => Err(LedgerError::InvalidArgument(format!(
                "function {:?} is not supported",
                function
            ))),
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| LedgerError::InvalidArgument(format!("argument is not valid UTF-8: {}", e)))
}

impl<S: Storage> Ledger<S> {
    /// Run `invocation` on behalf of the caller resolved by `resolver`
    pub fn invoke<R: IdentityResolver>(
        &self,
        resolver: &R,
        invocation: Invocation,
    ) -> Result<Response> {
        let caller = resolver.resolve_caller_identity()?;

        match invocation {
            Invocation::Genesis(bytes) => {
                let tx = Transaction::from_bytes(&bytes)?;
                self.genesis(&caller, &tx)?;

                Ok(Response::Empty)
            }
            Invocation::Spend(bytes) => {
                let candidate = Transaction::from_bytes(&bytes)?;

                Ok(match self.spend(&caller, &candidate)? {
                    Some(change_tx) => Response::Payload(change_tx.to_bytes()?),
                    None => Response::Empty,
                })
            }
            Invocation::Query(query) => self.query(&caller, query).map(Response::Payload),
        }
    }
}
