//! Re-entrancy guard for recursive resolution.
//!
//! Resolving one declaration performs direct nested calls into dependencies,
//! so the same identity must never be entered twice on one call stack: two
//! classes referencing each other (by inheritance links or through constant
//! expressions) must fail with the cycle path, not loop.

use std::hash::Hash;

use rustc_hash::FxHashSet;

/// Tracks the set and order of keys currently being visited.
#[derive(Debug)]
pub struct RecursionGuard<K> {
    visiting: FxHashSet<K>,
    path: Vec<K>,
}

impl<K: Clone + Eq + Hash> RecursionGuard<K> {
    pub fn new() -> Self {
        Self {
            visiting: FxHashSet::default(),
            path: Vec::new(),
        }
    }

    /// Enters `key`, or returns the cycle path (from the first occurrence of
    /// `key` down to and including the repeat) if it is already active.
    pub fn enter(&mut self, key: K) -> Result<(), Vec<K>> {
        if self.visiting.contains(&key) {
            let start = self
                .path
                .iter()
                .position(|entry| *entry == key)
                .unwrap_or(0);
            let mut cycle: Vec<K> = self.path[start..].to_vec();
            cycle.push(key);
            return Err(cycle);
        }
        self.visiting.insert(key.clone());
        self.path.push(key);
        Ok(())
    }

    /// Leaves `key`. Keys must leave in reverse entry order.
    pub fn leave(&mut self, key: &K)
    where
        K: std::fmt::Debug,
    {
        debug_assert_eq!(self.path.last(), Some(key), "unbalanced recursion guard");
        self.visiting.remove(key);
        self.path.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn clear(&mut self) {
        self.visiting.clear();
        self.path.clear();
    }
}

impl<K: Clone + Eq + Hash> Default for RecursionGuard<K> {
    fn default() -> Self {
        Self::new()
    }
}
