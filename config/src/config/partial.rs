//! # Partial Config
//!
//! The __partial__ `Config` struct returned by the loaders. Every param is optional: the ones
//! that do not appear in the source are `None`, and [`Config::from_partial`] replaces them with
//! the [defaults](crate::defaults).
//!
//! [`Config::from_partial`]: crate::config::Config::from_partial
use std::path::PathBuf;

use serde::{de, Deserialize, Deserializer};
use utxo_data_structures::amount::Amount;

use crate::config::StorageBackend;

/// The partial configuration object
#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
    /// Logging-related configuration
    #[serde(default)]
    pub log: Log,

    /// Storage-related configuration
    #[serde(default)]
    pub storage: Storage,

    /// Genesis-related configuration
    #[serde(default)]
    pub genesis: Genesis,
}

/// Logging-specific partial configuration
#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Log {
    /// Level filter, `off` to `trace`
    #[serde(default)]
    #[serde(deserialize_with = "from_level")]
    pub level: Option<log::LevelFilter>,
}

/// Storage-specific partial configuration
#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Storage {
    /// Backend holding the ledger
    #[serde(default)]
    pub backend: Option<StorageBackend>,

    /// Path to the directory that will contain the database files
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Genesis-specific partial configuration
#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Genesis {
    /// Initial supply minted by the genesis transaction
    #[serde(default)]
    pub supply: Option<Amount>,
}

// Parse a level filter from its name, e.g. `debug`
fn from_level<'de, D>(deserializer: D) -> Result<Option<log::LevelFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer)?
        .parse()
        .map(Some)
        .map_err(de::Error::custom)
}
