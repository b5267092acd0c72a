//! # Spent-state index
//!
//! Secondary index that keeps, for every `(owner, transaction id)` pair, whether that
//! transaction's output is still spendable. It is stored apart from the transaction bodies so
//! that listing the unspent outputs of an owner is a single prefix scan.
use std::fmt;

use utxo_data_structures::chain::{Hash, OwnerId};
use utxo_storage::{
    composite_key,
    storage::{Storage, WriteBatch},
};

use crate::{keys, LedgerError, Result};

/// Stored value of an unspent entry
const UNSPENT: u8 = 0x01;
/// Stored value of a spent entry
const SPENT: u8 = 0x10;

/// State of a spent-state entry
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpentState {
    Unspent,
    Spent,
}

/// Events that move a spent-state entry
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpentEvent {
    /// The transaction has been registered as spendable
    Mint,
    /// The transaction has been consumed as the input of a later spend
    Consume,
}

impl SpentState {
    /// Total transition function. Consuming a spent entry leaves it spent.
    pub fn transition(self, event: SpentEvent) -> SpentState {
        match (self, event) {
            (_, SpentEvent::Mint) => SpentState::Unspent,
            (SpentState::Unspent, SpentEvent::Consume) | (SpentState::Spent, SpentEvent::Consume) => {
                SpentState::Spent
            }
        }
    }

    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            SpentState::Unspent => vec![UNSPENT],
            SpentState::Spent => vec![SPENT],
        }
    }

    /// Decode a stored value, `None` if it is not a recognized state
    pub fn from_bytes(bytes: &[u8]) -> Option<SpentState> {
        match bytes {
            [UNSPENT] => Some(SpentState::Unspent),
            [SPENT] => Some(SpentState::Spent),
            _ => None,
        }
    }
}

impl fmt::Display for SpentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpentState::Unspent => f.write_str("unspent"),
            SpentState::Spent => f.write_str("spent"),
        }
    }
}

/// Entry found while scanning the index of an owner
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexEntry {
    pub tx_id: Hash,
    pub state: SpentState,
}

/// Accessor for the spent-state index stored in `S`
#[derive(Debug)]
pub struct SpentIndex<'a, S> {
    storage: &'a S,
}

impl<'a, S: Storage> SpentIndex<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Create the entry of a newly minted transaction in the `Unspent` state.
    ///
    /// Calling this twice for the same pair resets the entry to `Unspent`.
    pub fn init_entry(&self, owner: &OwnerId, tx_id: &Hash) -> Result<()> {
        let key = keys::spent_state(owner, tx_id)?;
        self.storage.put(key, SpentState::Unspent.to_bytes())?;

        Ok(())
    }

    /// Move an entry to `Spent`. Already spent entries are left untouched.
    pub fn mark_spent(&self, owner: &OwnerId, tx_id: &Hash) -> Result<()> {
        let state = self.state(owner, tx_id)?;
        let next = state.transition(SpentEvent::Consume);
        if next != state {
            let key = keys::spent_state(owner, tx_id)?;
            self.storage.put(key, next.to_bytes())?;
        }

        Ok(())
    }

    /// Whether the entry is `Unspent`
    pub fn is_unspent(&self, owner: &OwnerId, tx_id: &Hash) -> Result<bool> {
        Ok(self.state(owner, tx_id)? == SpentState::Unspent)
    }

    /// Read the state of an entry, failing if it is missing or holds an unrecognized value
    pub fn state(&self, owner: &OwnerId, tx_id: &Hash) -> Result<SpentState> {
        let key = keys::spent_state(owner, tx_id)?;
        let value = self.storage.get(&key)?.ok_or_else(|| {
            LedgerError::NotFound(format!(
                "spent-state entry of transaction {} for owner {}",
                tx_id, owner
            ))
        })?;

        SpentState::from_bytes(&value).ok_or_else(|| LedgerError::Corrupted {
            key: format!("{}/{}", owner, tx_id),
            value: hex::encode(&value),
        })
    }

    /// Scan all the entries of `owner` in key order.
    ///
    /// Entries whose key or value can not be decoded are not returned: they are handed to
    /// `on_malformed` and the scan goes on.
    pub fn scan<F>(&self, owner: &OwnerId, mut on_malformed: F) -> Result<Vec<IndexEntry>>
    where
        F: FnMut(&[u8], &[u8]),
    {
        let prefix = keys::spent_state_prefix(owner)?;
        let owner_part = owner.to_string();
        let mut entries = vec![];

        for item in self.storage.prefix_iterator(&prefix)? {
            let (key, value) = item?;

            let tx_id = composite_key::decode(&key)
                .ok()
                .and_then(|(namespace, parts)| match parts.as_slice() {
                    [owner, tx_id] if namespace == keys::SPENT_STATE_INDEX && *owner == owner_part => {
                        tx_id.parse::<Hash>().ok()
                    }
                    _ => None,
                });
            let state = SpentState::from_bytes(&value);

            match (tx_id, state) {
                (Some(tx_id), Some(state)) => entries.push(IndexEntry { tx_id, state }),
                _ => on_malformed(&key, &value),
            }
        }

        Ok(entries)
    }
}

/// Queue the creation of an `Unspent` entry in `batch`
pub fn stage_init_entry(batch: &mut WriteBatch, owner: &OwnerId, tx_id: &Hash) -> Result<()> {
    let key = keys::spent_state(owner, tx_id)?;
    batch.put(key, SpentState::Unspent.to_bytes());

    Ok(())
}

/// Queue the transition of an entry currently in `state` to `Spent` in `batch`
pub fn stage_mark_spent(
    batch: &mut WriteBatch,
    owner: &OwnerId,
    tx_id: &Hash,
    state: SpentState,
) -> Result<()> {
    let next = state.transition(SpentEvent::Consume);
    if next != state {
        let key = keys::spent_state(owner, tx_id)?;
        batch.put(key, next.to_bytes());
    }

    Ok(())
}
