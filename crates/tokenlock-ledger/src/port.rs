//! The ledger state-port trait.

use tokenlock_types::Result;

/// Key/value access to ledger state, as granted by the host transaction.
///
/// Reads observe the transaction's snapshot plus its own earlier writes.
/// Nothing becomes visible outside the transaction until the host commits
/// it, and the host commits all of a transaction's writes or none.
pub trait LockLedger {
    /// Get a value by key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Put a key-value pair.
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;

    /// Apply a batch of writes in order.
    ///
    /// The default applies operations one at a time; backends that can
    /// fail midway should override it with a truly atomic version.
    fn write_batch(&mut self, batch: WriteBatch) -> Result<()> {
        for op in batch.operations {
            match op {
                BatchOp::Put { key, value } => self.put(&key, value)?,
                BatchOp::Delete { key } => self.delete(&key)?,
            }
        }
        Ok(())
    }
}

impl<L: LockLedger + ?Sized> LockLedger for &mut L {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        (**self).scan_prefix(prefix)
    }

    fn write_batch(&mut self, batch: WriteBatch) -> Result<()> {
        (**self).write_batch(batch)
    }
}

/// A batch of write operations, staged while an operation validates and
/// applied only once it has fully succeeded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    /// Operations in the batch.
    pub operations: Vec<BatchOp>,
}

/// A single operation in a write batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    pub fn put(&mut self, key: String, value: Vec<u8>) {
        self.operations.push(BatchOp::Put { key, value });
    }

    pub fn delete(&mut self, key: String) {
        self.operations.push(BatchOp::Delete { key });
    }

    /// The most recent staged value for `key`: `Some(Some(v))` if put,
    /// `Some(None)` if deleted, `None` if untouched.
    #[must_use]
    pub fn staged(&self, key: &str) -> Option<Option<&[u8]>> {
        self.operations.iter().rev().find_map(|op| match op {
            BatchOp::Put { key: k, value } if k == key => Some(Some(value.as_slice())),
            BatchOp::Delete { key: k } if k == key => Some(None),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }
}
