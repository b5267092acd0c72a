//! # Config
//!
//! The `Config` struct in this module is __total__: it contains all the params needed by the rest
//! of the application. The loaders return a [partial](partial::Config) configuration instead,
//! which is turned into a total one with `Config::from_partial`.
//!
//! ```
//! use utxo_config::config::{partial, Config};
//!
//! assert_eq!(Config::from_partial(&partial::Config::default()), Config::default());
//! ```
use std::{fmt, path::PathBuf};

use serde::Deserialize;
use utxo_data_structures::amount::Amount;

use crate::defaults::{Defaults, Standard};

pub mod partial;

/// The total configuration object
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Logging-related configuration
    pub log: Log,

    /// Storage-related configuration
    pub storage: Storage,

    /// Genesis-related configuration
    pub genesis: Genesis,
}

/// Logging-specific configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    pub level: log::LevelFilter,
}

/// Storage-specific configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Storage {
    /// Backend holding the ledger
    pub backend: StorageBackend,

    /// Path to the directory that will contain the database files. Only used by persistent
    /// backends.
    pub db_path: PathBuf,
}

/// Genesis-specific configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Genesis {
    /// Initial supply minted by the genesis transaction
    pub supply: Amount,
}

/// Possible values for the "storage.backend" configuration param
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// Volatile in-memory storage
    #[serde(rename = "memory")]
    Memory,
    /// RocksDB database at `storage.db_path`
    #[serde(rename = "rocksdb")]
    RocksDb,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => f.write_str("memory"),
            StorageBackend::RocksDb => f.write_str("rocksdb"),
        }
    }
}

impl Config {
    pub fn from_partial(config: &partial::Config) -> Self {
        let defaults = Standard;

        Config {
            log: Log::from_partial(&config.log, &defaults),
            storage: Storage::from_partial(&config.storage, &defaults),
            genesis: Genesis::from_partial(&config.genesis, &defaults),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_partial(&partial::Config::default())
    }
}

impl Log {
    pub fn from_partial(config: &partial::Log, defaults: &dyn Defaults) -> Self {
        Log {
            level: config.level.unwrap_or_else(|| defaults.log_level()),
        }
    }
}

impl Storage {
    pub fn from_partial(config: &partial::Storage, defaults: &dyn Defaults) -> Self {
        Storage {
            backend: config
                .backend
                .unwrap_or_else(|| defaults.storage_backend()),
            db_path: config
                .db_path
                .to_owned()
                .unwrap_or_else(|| defaults.storage_db_path()),
        }
    }
}

impl Genesis {
    pub fn from_partial(config: &partial::Genesis, defaults: &dyn Defaults) -> Self {
        Genesis {
            supply: config.supply.unwrap_or_else(|| defaults.genesis_supply()),
        }
    }
}
