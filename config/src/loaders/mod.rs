//! Configuration loaders

pub mod toml;
