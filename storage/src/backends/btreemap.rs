//! # BTreeMap storage backend
//!
//! Storage backend that keeps data in a heap-allocated BTreeMap. Keys are kept sorted, so prefix
//! iteration yields entries in lexicographic key order, like an on-disk backend would.
use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};

use crate::storage::{Result, Storage, StorageIterator, WriteBatch, WriteBatchItem};

/// BTreeMap backend
pub type Backend = RwLock<BTreeMap<Vec<u8>, Vec<u8>>>;

fn poisoned<T>(_err: PoisonError<T>) -> anyhow::Error {
    anyhow::anyhow!("BTreeMap backend lock poisoned")
}

impl Storage for Backend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.read().map_err(poisoned)?.get(key).cloned())
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        self.write().map_err(poisoned)?.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.write().map_err(poisoned)?.remove(key);
        Ok(())
    }

    fn prefix_iterator<'a, 'b: 'a>(&'a self, prefix: &'b [u8]) -> Result<StorageIterator<'a>> {
        let map = self.read().map_err(poisoned)?;
        // The read lock is released before the caller iterates
        let entries: Vec<Result<(Vec<u8>, Vec<u8>)>> = map
            .range(prefix.to_vec()..)
            .take_while(|(k, _v)| k.starts_with(prefix))
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();

        Ok(Box::new(entries.into_iter()))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        // The write lock is held for the whole batch
        let mut map = self.write().map_err(poisoned)?;

        for item in batch.batch {
            match item {
                WriteBatchItem::Put(key, value) => {
                    map.insert(key, value);
                }
                WriteBatchItem::Delete(key) => {
                    map.remove(&key);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> Box<dyn Storage> {
        Box::new(Backend::default())
    }

    fn collect(storage: &dyn Storage, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        storage
            .prefix_iterator(prefix)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_btreemap() {
        let storage = backend();

        assert_eq!(None, storage.get(b"name").unwrap());
        storage.put(b"name".to_vec(), b"john".to_vec()).unwrap();
        assert_eq!(Some("john".into()), storage.get(b"name").unwrap());
        storage.delete(b"name").unwrap();
        assert_eq!(None, storage.get(b"name").unwrap());
    }

    #[test]
    fn test_iterator_sorted() {
        let storage = backend();

        storage.put(b"prefix-b".to_vec(), b"bob".to_vec()).unwrap();
        storage.put(b"noprefix".to_vec(), b"eve".to_vec()).unwrap();
        storage
            .put(b"prefix-a".to_vec(), b"alice".to_vec())
            .unwrap();
        storage.put(b"prefiy".to_vec(), b"mallory".to_vec()).unwrap();

        assert_eq!(
            collect(storage.as_ref(), b"prefix-"),
            vec![
                (b"prefix-a".to_vec(), b"alice".to_vec()),
                (b"prefix-b".to_vec(), b"bob".to_vec())
            ]
        );
    }

    #[test]
    fn test_iterator_empty() {
        let storage = backend();
        storage.put(b"other".to_vec(), b"eve".to_vec()).unwrap();

        assert!(collect(storage.as_ref(), b"prefix-").is_empty());
    }

    #[test]
    fn test_write_batch() {
        let storage = backend();
        storage.put(b"stale".to_vec(), b"x".to_vec()).unwrap();

        let mut batch = WriteBatch::default();
        batch.put(b"a".to_vec(), b"1".to_vec());
        batch.put(b"b".to_vec(), b"2".to_vec());
        batch.delete(b"stale".to_vec());
        batch.put(b"a".to_vec(), b"3".to_vec());
        assert_eq!(batch.len(), 4);

        storage.write(batch).unwrap();

        assert_eq!(Some(b"3".to_vec()), storage.get(b"a").unwrap());
        assert_eq!(Some(b"2".to_vec()), storage.get(b"b").unwrap());
        assert_eq!(None, storage.get(b"stale").unwrap());
    }
}
