//! Per-path serialization of file operations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Table of mutexes keyed by resolved path.
///
/// Operations on the same path run one at a time; operations on different
/// paths do not contend beyond the brief table lookup. Entries are dropped
/// as soon as nobody holds or waits on them.
#[derive(Debug, Default)]
pub struct PathLocks {
    table: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `path`.
    pub fn with_lock<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let entry = {
            let mut table = self.table();
            Arc::clone(table.entry(path.to_path_buf()).or_default())
        };

        let result = {
            // The guarded value is `()`, so a poisoned lock carries no broken state.
            let _guard = entry.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut table = self.table();
        // One reference lives in the table and one is ours: nobody else is waiting.
        if Arc::strong_count(&entry) == 2 {
            table.remove(path);
        }
        result
    }

    /// Number of paths with an operation in flight.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Whether no operation is in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<Mutex<()>>>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
