//! # Configuration
//!
//! The configuration is read from a TOML file into a __partial__ config (see
//! [`config::partial`]) and merged with the [`defaults`] into a __total__ [`config::Config`].
//!
//! ```
//! use utxo_config::{config::Config, loaders};
//!
//! let partial = loaders::toml::from_str("[storage]\nbackend = \"memory\"").unwrap();
//! let config = Config::from_partial(&partial);
//! ```

#![deny(rust_2018_idioms)]
#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]

pub mod config;
pub mod defaults;
pub mod loaders;
