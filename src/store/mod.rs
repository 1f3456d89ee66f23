//! Key-value persistence for the session record.
//!
//! The dashboard treats its store as an opaque synchronous key → string map
//! with a fixed capacity, the same contract a browser's local storage gives a
//! page. Writes that would push the total size past the capacity fail with
//! [`StoreError::QuotaExceeded`] and leave the previous value in place.
//!
//! Two implementations are provided:
//!
//! - [`FileStore`] — a JSON object on disk (`~/.hemdash/storage.json`).
//! - [`MemoryStore`] — in-process map, used by tests and dry runs.

mod file;

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded: writing '{key}' needs {needed} bytes, capacity is {capacity}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        capacity: usize,
    },

    #[error("storage file {path} is not a valid key-value document: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Synchronous string key-value store with a capacity limit.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Bytes a set of entries occupies against the store capacity.
///
/// Counts key and value lengths, which is how browsers account local storage.
pub(crate) fn usage<'a>(entries: impl Iterator<Item = (&'a String, &'a String)>) -> usize {
    entries.map(|(k, v)| k.len() + v.len()).sum()
}

/// Check whether replacing `key` with `value` keeps `entries` within `capacity`.
pub(crate) fn check_quota(
    entries: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    capacity: usize,
) -> Result<(), StoreError> {
    let others = usage(entries.iter().filter(|(k, _)| k.as_str() != key));
    let needed = others + key.len() + value.len();
    if needed > capacity {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            needed,
            capacity,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    capacity: usize,
}

impl MemoryStore {
    /// Default capacity, matching the file store's default (5 MiB).
    pub const DEFAULT_CAPACITY: usize = 5 * 1024 * 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity,
        }
    }

    /// Current usage in bytes.
    pub fn used_bytes(&self) -> usize {
        usage(self.entries.iter())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        check_quota(&self.entries, key, value, self.capacity)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
