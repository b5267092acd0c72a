//! # Default values
//!
//! Values used for every configuration param missing from the configuration file.
use std::path::PathBuf;

use utxo_data_structures::amount::{Amount, MICROS_PER_UNIT};

use crate::config::StorageBackend;

/// Trait defining all the configuration params that have a suitable default value
pub trait Defaults {
    /// Default log level: `info`
    fn log_level(&self) -> log::LevelFilter {
        log::LevelFilter::Info
    }

    /// Default storage backend: in memory
    fn storage_backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    /// Default path for the database: `.utxo_db`
    fn storage_db_path(&self) -> PathBuf {
        PathBuf::from(".utxo_db")
    }

    /// Default initial supply: `100000`
    fn genesis_supply(&self) -> Amount {
        Amount::from_micros(100_000 * MICROS_PER_UNIT)
    }
}

/// Defaults used when nothing else is configured
#[derive(Clone, Copy, Debug, Default)]
pub struct Standard;

impl Defaults for Standard {}
