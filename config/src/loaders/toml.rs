//! Load the configuration from a file or a `String` written in [Toml format](https://en.wikipedia.org/wiki/TOML)
use std::{fs, io, path::Path};

use thiserror::Error;

use crate::config::partial::Config;

/// Errors this module can fail with
#[derive(Debug, Error)]
pub enum Error {
    /// Indicates there was an error when trying to load configuration from a file.
    #[error("could not read configuration file: {0}")]
    IOError(#[from] io::Error),
    /// Indicates the Toml given is not a valid configuration.
    #[error("invalid configuration: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Just like `std::result::Result` but with the error param fixed to `Error` type in this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Load configuration from a file written in Toml format.
pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<Config> {
    let contents = fs::read_to_string(filename)?;

    from_str(&contents)
}

/// Load configuration from a string written in Toml format.
pub fn from_str(contents: &str) -> Result<Config> {
    Ok(toml::from_str(contents)?)
}
