//! # Query engine
//!
//! Read-only lookups over the ledger, always scoped to the owner resolved for the caller.
use std::{fmt, str::FromStr};

use utxo_data_structures::chain::{Hash, Input, OwnerId, Transaction, TxIdList};
use utxo_storage::storage::Storage;

use crate::{index::SpentState, Ledger, LedgerError, Result};

/// Query accepted by the ledger
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Query {
    /// Point lookup of a transaction
    ById(Hash),
    /// Transactions of the caller that can still be spent
    Unspent,
    /// Transactions of the caller that have already been consumed
    Spent,
    /// All the transactions of the caller
    All,
}

/// Query mode names, as used by the invokers of the ledger
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryMode {
    ById,
    Unspent,
    Spent,
    All,
}

impl FromStr for QueryMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "identify" | "byid" => Ok(QueryMode::ById),
            "unspent" => Ok(QueryMode::Unspent),
            "spent" => Ok(QueryMode::Spent),
            "all" => Ok(QueryMode::All),
            _ => Err(LedgerError::InvalidArgument(format!(
                "unknown query mode {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryMode::ById => "Identify",
            QueryMode::Unspent => "Unspent",
            QueryMode::Spent => "Spent",
            QueryMode::All => "All",
        };

        f.write_str(name)
    }
}

impl Query {
    /// Build a query from its mode name and optional transaction identifier.
    ///
    /// Only the `Identify` mode uses the identifier, and it requires it.
    pub fn from_mode(mode: &str, tx_id: Option<&str>) -> Result<Self> {
        match mode.parse::<QueryMode>()? {
            QueryMode::ById => {
                let tx_id = tx_id.ok_or_else(|| {
                    LedgerError::InvalidArgument("query by id requires a transaction id".to_string())
                })?;
                let tx_id = tx_id.parse().map_err(|e| {
                    LedgerError::InvalidArgument(format!("invalid transaction id {:?}: {}", tx_id, e))
                })?;

                Ok(Query::ById(tx_id))
            }
            QueryMode::Unspent => Ok(Query::Unspent),
            QueryMode::Spent => Ok(Query::Spent),
            QueryMode::All => Ok(Query::All),
        }
    }

    pub fn mode(&self) -> QueryMode {
        match self {
            Query::ById(_) => QueryMode::ById,
            Query::Unspent => QueryMode::Unspent,
            Query::Spent => QueryMode::Spent,
            Query::All => QueryMode::All,
        }
    }

    /// Whether an entry in `state` belongs to the result of a listing query
    fn matches(&self, state: SpentState) -> bool {
        match self {
            Query::ById(_) => false,
            Query::Unspent => state == SpentState::Unspent,
            Query::Spent => state == SpentState::Spent,
            Query::All => true,
        }
    }
}

impl<S: Storage> Ledger<S> {
    /// Canonical bytes of the transaction with this identifier
    pub fn by_id(&self, tx_id: &Hash) -> Result<Vec<u8>> {
        self.get_transaction_bytes(&Input::Transaction(*tx_id))
    }

    /// Transaction with this identifier
    pub fn transaction(&self, tx_id: &Hash) -> Result<Transaction> {
        self.get_transaction(&Input::Transaction(*tx_id))
    }

    /// Identifiers of the unspent transactions of `owner`
    pub fn unspent(&self, owner: &OwnerId) -> Result<Vec<Hash>> {
        self.list(owner, Query::Unspent)
    }

    /// Identifiers of the spent transactions of `owner`
    pub fn spent(&self, owner: &OwnerId) -> Result<Vec<Hash>> {
        self.list(owner, Query::Spent)
    }

    /// Identifiers of all the transactions of `owner`
    pub fn all(&self, owner: &OwnerId) -> Result<Vec<Hash>> {
        self.list(owner, Query::All)
    }

    /// Run `query` on behalf of `owner` and serialize its result
    pub fn query(&self, owner: &OwnerId, query: Query) -> Result<Vec<u8>> {
        match query {
            Query::ById(tx_id) => self.by_id(&tx_id),
            listing => {
                let tx_ids = self.list(owner, listing)?;

                Ok(TxIdList { tx_ids }.to_bytes()?)
            }
        }
    }

    /// Scan the spent-state index of `owner`, in key order, keeping the entries that match
    /// `query`.
    ///
    /// Malformed entries are skipped: they are logged and counted, but do not abort the scan.
    fn list(&self, owner: &OwnerId, query: Query) -> Result<Vec<Hash>> {
        let entries = self.index().scan(owner, |key, value| {
            log::warn!(
                "Skipping malformed spent-state entry {} = {}",
                hex::encode(key),
                hex::encode(value)
            );
            self.record_skipped_index_entry();
        })?;

        let tx_ids: Vec<Hash> = entries
            .into_iter()
            .filter(|entry| query.matches(entry.state))
            .map(|entry| entry.tx_id)
            .collect();
        log::debug!(
            "{} query for {} matched {} transactions",
            query.mode(),
            owner,
            tx_ids.len()
        );

        Ok(tx_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names() {
        assert_eq!("Identify".parse::<QueryMode>().unwrap(), QueryMode::ById);
        assert_eq!("byId".parse::<QueryMode>().unwrap(), QueryMode::ById);
        assert_eq!("unspent".parse::<QueryMode>().unwrap(), QueryMode::Unspent);
        assert_eq!("Spent".parse::<QueryMode>().unwrap(), QueryMode::Spent);
        assert_eq!("ALL".parse::<QueryMode>().unwrap(), QueryMode::All);
        assert!(matches!(
            "balance".parse::<QueryMode>(),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert_eq!(QueryMode::ById.to_string(), "Identify");
    }

    #[test]
    fn query_from_mode() {
        let tx_id = Hash::SHA256([7; 32]);

        assert_eq!(
            Query::from_mode("Identify", Some(&tx_id.to_string())).unwrap(),
            Query::ById(tx_id)
        );
        assert_eq!(Query::from_mode("All", None).unwrap(), Query::All);
        assert_eq!(Query::from_mode("Unspent", Some("ignored")).unwrap(), Query::Unspent);
        assert!(matches!(
            Query::from_mode("Identify", None),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(matches!(
            Query::from_mode("Identify", Some("abcd")),
            Err(LedgerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn listing_filters() {
        assert!(Query::Unspent.matches(SpentState::Unspent));
        assert!(!Query::Unspent.matches(SpentState::Spent));
        assert!(Query::Spent.matches(SpentState::Spent));
        assert!(!Query::Spent.matches(SpentState::Unspent));
        assert!(Query::All.matches(SpentState::Spent));
        assert!(Query::All.matches(SpentState::Unspent));
    }
}
