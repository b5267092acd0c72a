//! # Rocksdb storage backend
//!
//! Storage backend that persists data in the file system using a RocksDB database.
use std::path::Path;

use thiserror::Error;

use crate::storage::{Result, Storage, StorageIterator, WriteBatch, WriteBatchItem};

/// Rocksdb backend
pub type Backend = rocksdb::DB;

/// Rocksdb Options
pub type Options = rocksdb::Options;

#[derive(Debug, Error)]
#[error("RocksDB error: {0}")]
struct Error(#[source] rocksdb::Error);

/// Open (creating it if missing) the database at `path`
pub fn open<P: AsRef<Path>>(path: P) -> Result<Backend> {
    let mut opts = Options::default();
    opts.create_if_missing(true);

    let db = Backend::open(&opts, path).map_err(Error)?;

    Ok(db)
}

impl Storage for Backend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let result = Backend::get(self, key).map_err(Error)?;
        Ok(result)
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        Backend::put(self, key, value).map_err(Error)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        Backend::delete(self, key).map_err(Error)?;
        Ok(())
    }

    fn prefix_iterator<'a, 'b: 'a>(&'a self, prefix: &'b [u8]) -> Result<StorageIterator<'a>> {
        let iterator = Backend::prefix_iterator(self, prefix)
            .map(|result| {
                result
                    .map(|(k, v)| (Vec::<u8>::from(k), Vec::<u8>::from(v)))
                    .map_err(|e| anyhow::Error::from(Error(e)))
            })
            .take_while(move |item| match item {
                Ok((k, _v)) => k.starts_with(prefix),
                Err(_) => true,
            });

        Ok(Box::new(iterator))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        let mut rocksdb_batch = rocksdb::WriteBatch::default();

        for item in batch.batch {
            match item {
                WriteBatchItem::Put(key, value) => {
                    rocksdb_batch.put(key, value);
                }
                WriteBatchItem::Delete(key) => {
                    rocksdb_batch.delete(key);
                }
            }
        }

        Backend::write(self, rocksdb_batch).map_err(Error)?;

        Ok(())
    }
}
