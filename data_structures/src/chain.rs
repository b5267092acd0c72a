use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utxo_crypto::hash::{calculate_sha256, Sha256, SHA256_LENGTH};

use crate::{amount::Amount, error::TransactionError};

pub trait Hashable {
    fn hash(&self) -> Hash;
}

/// Any reference to a Hashable type is also Hashable
impl<T: Hashable> Hashable for &T {
    fn hash(&self) -> Hash {
        (*self).hash()
    }
}

/// SHA-256 Hash
pub type SHA256 = [u8; SHA256_LENGTH];

/// Hash
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub enum Hash {
    /// SHA-256 Hash
    SHA256(SHA256),
}

impl Default for Hash {
    fn default() -> Hash {
        Hash::SHA256([0; SHA256_LENGTH])
    }
}

/// Conversion between utxo_crypto::Sha256 and utxo_data_structures::Hash
impl From<Sha256> for Hash {
    fn from(x: Sha256) -> Self {
        Hash::SHA256(x.0)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        match self {
            Hash::SHA256(x) => x.as_ref(),
        }
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hash::SHA256(h) => f.write_str(&hex::encode(h)),
        }
    }
}

/// Error when parsing hash from string
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HashParseError {
    #[error("Failed to parse hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Invalid hash length: expected 32 bytes but got {0}")]
    InvalidLength(usize),
}

impl FromStr for Hash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;

        Hash::from_bytes(&bytes)
    }
}

impl Hash {
    /// Build a hash from exactly 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashParseError> {
        let mut x = [0; SHA256_LENGTH];
        if bytes.len() != x.len() {
            return Err(HashParseError::InvalidLength(bytes.len()));
        }
        x.copy_from_slice(bytes);

        Ok(Hash::SHA256(x))
    }
}

/// Owner identifier: the SHA-256 digest of an authenticated caller's credential.
///
/// It is used both as the output of a transaction and as the prefix under which the spent-state
/// index keeps that owner's transactions.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OwnerId {
    pub(crate) hash: SHA256,
}

impl OwnerId {
    /// Derive the owner identifier of a credential
    pub fn from_credential(credential: &[u8]) -> Self {
        Self {
            hash: calculate_sha256(credential).0,
        }
    }

    /// Build an owner identifier from its raw 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashParseError> {
        let Hash::SHA256(hash) = Hash::from_bytes(bytes)?;

        Ok(Self { hash })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.hash
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.hash))
    }
}

impl FromStr for OwnerId {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;

        OwnerId::from_bytes(&bytes)
    }
}

/// Literal used on the wire for the coinbase input
pub const COINBASE: &str = "CoinBase";

/// Reference consumed by a transaction
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Input {
    /// Sentinel marking a transaction that mints value instead of consuming a previous output
    CoinBase,
    /// Identifier of a previous transaction whose output is consumed
    Transaction(Hash),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::CoinBase => f.write_str(COINBASE),
            Input::Transaction(hash) => fmt::Display::fmt(hash, f),
        }
    }
}

impl FromStr for Input {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == COINBASE {
            Ok(Input::CoinBase)
        } else {
            s.parse().map(Input::Transaction)
        }
    }
}

/// Transaction data structure
///
/// Immutable once created; its identity is the hash of its canonical serialization, so two
/// transactions with identical fields are the same transaction.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Consumed transactions, or a single `CoinBase` for minting transactions
    pub inputs: Vec<Input>,
    /// Owner that exclusively controls the value of this transaction
    pub output: OwnerId,
    /// Value carried by this transaction
    pub fee: Amount,
}

impl Transaction {
    /// Create a transaction that mints `fee` to `output`
    pub fn coinbase(output: OwnerId, fee: Amount) -> Self {
        Self {
            inputs: vec![Input::CoinBase],
            output,
            fee,
        }
    }

    /// Whether this transaction mints value rather than consuming previous outputs
    pub fn is_coinbase(&self) -> bool {
        self.inputs.as_slice() == [Input::CoinBase]
    }

    /// Canonical JSON serialization, `{"inputs":[...],"output":"<hex>","fee":"<decimal>"}`
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        serde_json::to_vec(self).map_err(|e| TransactionError::Malformed(e.to_string()))
    }

    /// Parse a transaction from its JSON representation
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        serde_json::from_slice(bytes).map_err(|e| TransactionError::Malformed(e.to_string()))
    }
}

impl Hashable for Transaction {
    fn hash(&self) -> Hash {
        // Every field serializes to a JSON string, so `to_bytes` never fails here
        calculate_sha256(&self.to_bytes().unwrap_or_default()).into()
    }
}

/// List of transaction identifiers returned by the listing queries
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct TxIdList {
    #[serde(rename = "tx_id")]
    pub tx_ids: Vec<Hash>,
}

impl TxIdList {
    /// JSON serialization, `{"tx_id":["<hex>",...]}`
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        serde_json::to_vec(self).map_err(|e| TransactionError::Malformed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        serde_json::from_slice(bytes).map_err(|e| TransactionError::Malformed(e.to_string()))
    }
}
