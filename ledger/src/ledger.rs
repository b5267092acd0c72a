//! # Ledger
//!
//! Genesis issuance and the spend protocol. Both validate every precondition before touching the
//! storage, and then commit all of their writes in a single atomic `WriteBatch`.
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use utxo_data_structures::{
    amount::Amount,
    chain::{Hash, Hashable, Input, OwnerId, Transaction},
    error::TransactionError,
    transaction_factory,
};
use utxo_storage::storage::{Storage, WriteBatch};

use crate::{
    index::{self, SpentIndex, SpentState},
    keys, LedgerError, Result,
};

/// UTXO ledger on top of a `Storage` backend
#[derive(Debug)]
pub struct Ledger<S> {
    storage: S,
    /// Serializes genesis and spend calls, so that no two of them can validate the same input
    /// before either one has marked it as spent
    writer: Mutex<()>,
    /// Malformed spent-state entries skipped by the listing queries
    skipped_index_entries: AtomicU64,
}

impl<S: Storage> Ledger<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            writer: Mutex::new(()),
            skipped_index_entries: AtomicU64::new(0),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Spent-state index over this ledger's storage
    pub fn index(&self) -> SpentIndex<'_, S> {
        SpentIndex::new(&self.storage)
    }

    /// Number of malformed spent-state entries skipped by scans so far
    pub fn skipped_index_entries(&self) -> u64 {
        self.skipped_index_entries.load(Ordering::Relaxed)
    }

    pub(crate) fn record_skipped_index_entry(&self) {
        self.skipped_index_entries.fetch_add(1, Ordering::Relaxed);
    }

    /// Stored canonical bytes of the transaction referenced by `input`.
    ///
    /// The `CoinBase` sentinel is never registered, so looking it up fails with `NotFound`.
    pub fn get_transaction_bytes(&self, input: &Input) -> Result<Vec<u8>> {
        let key = keys::transaction(input)?;

        self.storage
            .get(&key)?
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", input)))
    }

    /// Transaction referenced by `input`
    pub fn get_transaction(&self, input: &Input) -> Result<Transaction> {
        let bytes = self.get_transaction_bytes(input)?;

        Transaction::from_bytes(&bytes).map_err(|e| LedgerError::Corrupted {
            key: format!("transaction {}", input),
            value: e.to_string(),
        })
    }

    /// Register the genesis transaction `tx` submitted by `caller`.
    ///
    /// The transaction must mint a positive amount to the caller through a single `CoinBase`
    /// input. Calling this more than once per ledger is up to the invoker; a repeated identical
    /// genesis registers the same transaction again and leaves it unspent.
    pub fn genesis(&self, caller: &OwnerId, tx: &Transaction) -> Result<Hash> {
        if !tx.is_coinbase() {
            return Err(LedgerError::InvalidArgument(
                "genesis transaction must have a single CoinBase input".to_string(),
            ));
        }
        if tx.fee.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "initial supply must be greater than zero".to_string(),
            ));
        }
        if tx.output != *caller {
            return Err(LedgerError::Unauthorized {
                owner: tx.output,
                caller: *caller,
            });
        }

        let _guard = self.writer.lock()?;

        let tx_id = tx.hash();
        self.warn_if_unspent(&tx.output, &tx_id);

        let mut batch = WriteBatch::default();
        Self::stage_mint(&mut batch, &tx_id, tx)?;
        self.storage.write(batch)?;

        log::info!(
            "Genesis transaction {} minted {} to {}",
            tx_id,
            tx.fee,
            tx.output
        );

        Ok(tx_id)
    }

    /// Mint `supply` to `caller` as the genesis transaction
    pub fn issue_genesis(&self, caller: &OwnerId, supply: Amount) -> Result<Transaction> {
        let tx = transaction_factory::make_genesis(*caller, supply);
        self.genesis(caller, &tx)?;

        Ok(tx)
    }

    /// Spend the outputs referenced by the inputs of `candidate`, all of which must belong to
    /// `caller` and be unspent.
    ///
    /// On success `candidate` is registered as unspent for its output, its inputs become spent,
    /// and the remainder of the inputs is minted back to `caller` as a change transaction, which
    /// is returned. No change transaction is created when the inputs match the output exactly.
    pub fn spend(&self, caller: &OwnerId, candidate: &Transaction) -> Result<Option<Transaction>> {
        if candidate.inputs.is_empty() {
            return Err(TransactionError::NoInputs.into());
        }

        let _guard = self.writer.lock()?;
        let spent_index = self.index();

        let mut consumed: Vec<(Hash, SpentState)> = Vec::with_capacity(candidate.inputs.len());
        let mut seen = HashSet::new();
        let mut inputs_sum = Amount::default();
        for input in &candidate.inputs {
            let input_tx = self.get_transaction(input)?;
            let input_id = input_tx.hash();

            if input_tx.output != *caller {
                return Err(LedgerError::Unauthorized {
                    owner: input_tx.output,
                    caller: *caller,
                });
            }
            if !seen.insert(input_id) {
                return Err(LedgerError::AlreadySpent(input_id));
            }
            let state = spent_index.state(caller, &input_id)?;
            if state == SpentState::Spent {
                return Err(LedgerError::AlreadySpent(input_id));
            }

            inputs_sum = inputs_sum
                .checked_add(input_tx.fee)
                .ok_or(TransactionError::InputValueOverflow)?;
            consumed.push((input_id, state));
        }

        let change = inputs_sum
            .checked_sub(candidate.fee)
            .ok_or(LedgerError::InsufficientFunds {
                inputs: inputs_sum,
                output: candidate.fee,
            })?;
        let change_tx = if change.is_zero() {
            None
        } else {
            Some(Transaction::coinbase(*caller, change))
        };

        let candidate_id = candidate.hash();
        let change_id = change_tx.as_ref().map(|tx| tx.hash());

        let mut batch = WriteBatch::default();
        self.warn_if_unspent(&candidate.output, &candidate_id);
        Self::stage_mint(&mut batch, &candidate_id, candidate)?;
        if let (Some(change_tx), Some(change_id)) = (&change_tx, &change_id) {
            if !seen.contains(change_id) {
                self.warn_if_unspent(caller, change_id);
            }
            Self::stage_mint(&mut batch, change_id, change_tx)?;
        }
        for (input_id, state) in &consumed {
            // An input minted again as this spend's change ends up unspent
            if Some(input_id) == change_id.as_ref() {
                continue;
            }
            index::stage_mark_spent(&mut batch, caller, input_id, *state)?;
        }
        self.storage.write(batch)?;

        log::debug!(
            "Transaction {} consumed {:?}",
            candidate_id,
            consumed.iter().map(|(id, _)| id.to_string()).collect::<Vec<_>>()
        );
        log::info!(
            "Transaction {} sent {} to {}, change {}",
            candidate_id,
            candidate.fee,
            candidate.output,
            change
        );

        Ok(change_tx)
    }

    /// Minting resets the entry of an already registered identical transaction. When that entry
    /// is still unspent the owner keeps a single output for both mints.
    fn warn_if_unspent(&self, owner: &OwnerId, tx_id: &Hash) {
        if let Ok(SpentState::Unspent) = self.index().state(owner, tx_id) {
            log::warn!(
                "Transaction {} is minted again while still unspent for {}",
                tx_id,
                owner
            );
        }
    }

    /// Queue the body of `tx` and its unspent entry under its output owner.
    ///
    /// Minting a transaction that is already registered rewrites the same body and resets its
    /// entry to `Unspent`.
    fn stage_mint(batch: &mut WriteBatch, tx_id: &Hash, tx: &Transaction) -> Result<()> {
        batch.put(keys::transaction_by_id(tx_id)?, tx.to_bytes()?);
        index::stage_init_entry(batch, &tx.output, tx_id)
    }
}
