//! Transaction-scoped write buffer.
//!
//! A [`TxScope`] stands in for the host's transaction semantics when the
//! core runs outside a real ledger (tests, replay tooling): writes stay in
//! the scope, reads see them, and nothing reaches the underlying ledger
//! until [`TxScope::commit`]. Dropping the scope discards every write.

use std::collections::BTreeMap;

use tokenlock_types::Result;

use crate::port::{LockLedger, WriteBatch};

/// Buffered view of a ledger for the duration of one transaction.
pub struct TxScope<'a, L: LockLedger> {
    inner: &'a mut L,
    /// `None` marks a buffered delete.
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl<'a, L: LockLedger> TxScope<'a, L> {
    pub fn new(inner: &'a mut L) -> Self {
        Self {
            inner,
            writes: BTreeMap::new(),
        }
    }

    /// Number of keys touched so far.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Apply every buffered write to the underlying ledger in one batch.
    pub fn commit(self) -> Result<()> {
        let mut batch = WriteBatch::new();
        for (key, value) in self.writes {
            match value {
                Some(value) => batch.put(key, value),
                None => batch.delete(key),
            }
        }
        tracing::debug!(writes = batch.len(), "Committing transaction scope");
        self.inner.write_batch(batch)
    }

    /// Drop every buffered write. Equivalent to dropping the scope.
    pub fn rollback(self) {
        tracing::debug!(writes = self.writes.len(), "Rolling back transaction scope");
    }
}

impl<L: LockLedger> LockLedger for TxScope<'_, L> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(buffered) => Ok(buffered.clone()),
            None => self.inner.get(key),
        }
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let mut merged: BTreeMap<String, Vec<u8>> =
            self.inner.scan_prefix(prefix)?.into_iter().collect();
        for (key, value) in self
            .writes
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(v) => {
                    merged.insert(key.clone(), v.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
