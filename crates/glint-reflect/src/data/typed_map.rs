//! The typed attribute map underlying every declaration record.
//!
//! A [`TypedMap`] is an immutable mapping from a closed set of keys
//! ([`DataKey`]) to heterogeneously-typed values. Each key is a zero-sized
//! witness type implementing [`Key`], which statically fixes the value type
//! and an optional fallback rule evaluated against the rest of the map when
//! the key is absent.
//!
//! `with`/`without` are copy-on-write: the original map is never mutated.
//! Maps are never merged wholesale; the inheritance resolvers combine them
//! key by key with explicit policy.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{DataKey, Value};

/// Statically-typed handle for one [`DataKey`].
pub trait Key: Copy {
    type Value: Clone;

    const KEY: DataKey;
    const NAME: &'static str;

    fn pack(value: Self::Value) -> Value;
    fn unpack(value: &Value) -> Option<Self::Value>;

    /// Default rule for absent keys; `None` marks the key mandatory.
    fn fallback(map: &TypedMap) -> Option<Self::Value> {
        let _ = map;
        None
    }
}

/// Immutable, copy-on-write attribute map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypedMap {
    entries: IndexMap<DataKey, Value>,
}

impl TypedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the key is physically present (fallbacks do not count).
    pub fn contains<K: Key>(&self, _key: K) -> bool {
        self.entries.contains_key(&K::KEY)
    }

    /// Returns a new map with `key` set to `value`.
    pub fn with<K: Key>(&self, _key: K, value: K::Value) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(K::KEY, K::pack(value));
        Self { entries }
    }

    /// Returns a new map without `key`. Removing an absent key is a no-op.
    pub fn without<K: Key>(&self, _key: K) -> Self {
        if !self.entries.contains_key(&K::KEY) {
            return self.clone();
        }
        let mut entries = self.entries.clone();
        entries.shift_remove(&K::KEY);
        Self { entries }
    }

    /// Reads `key`, falling back to the key's default rule when absent.
    pub fn try_get<K: Key>(&self, _key: K) -> Option<K::Value> {
        match self.entries.get(&K::KEY) {
            Some(value) => K::unpack(value),
            None => K::fallback(self),
        }
    }

    /// Reads `key`; absence of a mandatory key is a programming error.
    #[track_caller]
    pub fn get<K: Key>(&self, key: K) -> K::Value {
        match self.try_get(key) {
            Some(value) => value,
            None => panic!("typed map is missing mandatory key `{}`", K::NAME),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/typed_map_tests.rs"]
mod tests;
