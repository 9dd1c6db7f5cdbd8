//! Cache backend contract and the in-memory implementation.
//!
//! The store persists resolved records as opaque blobs under string keys.
//! Key validity constraints (length, character set) belong to the backend
//! and surface as configuration errors, never as resolution errors.

use dashmap::DashMap;
use thiserror::Error;

/// A backend rejected a key or an operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid cache key `{key}`: {reason}")]
pub struct CacheError {
    pub key: String,
    pub reason: String,
}

impl CacheError {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// String-keyed blob store.
///
/// Backends may be shared between processes; coordinating concurrent
/// external access is the backend's concern, not the resolver's.
pub trait CacheBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Process-local cache; accepts any key.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, Vec<u8>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of every entry, sorted by key. Used to compare cache state
    /// byte for byte.
    pub fn snapshot(&self) -> Vec<(String, Vec<u8>)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|left, right| left.0.cmp(&right.0));
        entries
    }
}

impl CacheBackend for InMemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}
