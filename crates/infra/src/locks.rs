//! Per-key mutual exclusion.
//!
//! The snapshot read-modify-write and the operation status transition are
//! critical sections that must be serialized per key. `KeyedLocks` hands
//! out one lazily allocated mutex per key; callers hold the returned cell
//! and lock it for the duration of the critical section.
//!
//! Cells are never reclaimed: key cardinality is bounded by the catalog
//! and operation count, and a `()` mutex is cheap.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::store::StorageError;

#[derive(Debug, Default)]
pub struct KeyedLocks<K> {
    cells: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch (or create) the mutex cell for `key`.
    ///
    /// ```ignore
    /// let cell = locks.acquire(key)?;
    /// let _guard = cell.lock().map_err(/* poisoned */)?;
    /// // ... critical section ...
    /// ```
    pub fn acquire(&self, key: K) -> Result<Arc<Mutex<()>>, StorageError> {
        let mut cells = self
            .cells
            .lock()
            .map_err(|_| StorageError::LockPoisoned("keyed lock registry".to_string()))?;
        Ok(cells.entry(key).or_default().clone())
    }
}
