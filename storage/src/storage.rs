//! # Storage
//!
//! Generic `Storage` trait that can be implemented for different specific storage backends.

/// Result type used by every storage backend
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Iterator over the key-value pairs sharing a prefix, in ascending key order
pub type StorageIterator<'a> = Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>)>> + 'a>;

/// This is a generic trait that exposes a very simple key/value CRUD API for data storage.
/// This trait can be easily implemented for any specific storage backend solution (databases,
/// volatile memory, flat files, etc.)
pub trait Storage {
    /// Get a value from the storage given its key
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Put a value in the storage
    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    /// Delete a value from the storage
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Create an iterator over all the keys that start with the given prefix
    fn prefix_iterator<'a, 'b: 'a>(&'a self, prefix: &'b [u8]) -> Result<StorageIterator<'a>>;

    /// Atomically write a batch of operations
    fn write(&self, batch: WriteBatch) -> Result<()>;
}

/// Any reference to a `Storage` is also a `Storage`
impl<T: Storage + ?Sized> Storage for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        (**self).delete(key)
    }

    fn prefix_iterator<'a, 'b: 'a>(&'a self, prefix: &'b [u8]) -> Result<StorageIterator<'a>> {
        (**self).prefix_iterator(prefix)
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        (**self).write(batch)
    }
}

/// Ordered list of operations that must be applied all at once
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    /// Operations, in the order they were added
    pub batch: Vec<WriteBatchItem>,
}

/// A single operation of a `WriteBatch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteBatchItem {
    /// Insert or overwrite a key
    Put(Vec<u8>, Vec<u8>),
    /// Remove a key
    Delete(Vec<u8>),
}

impl WriteBatch {
    /// Queue a put operation
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.batch.push(WriteBatchItem::Put(key, value));
    }

    /// Queue a delete operation
    pub fn delete(&mut self, key: Vec<u8>) {
        self.batch.push(WriteBatchItem::Delete(key));
    }

    /// Number of queued operations
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    /// Whether the batch has no operations
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}
