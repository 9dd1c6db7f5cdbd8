//! The resolution store.
//!
//! Resolution is transactional: declarations found in a resource are staged
//! as unevaluated thunks, evaluated on demand (possibly recursively, when
//! resolving one declaration requires another), and persisted to the cache
//! backend on commit — or discarded wholesale on rollback. Ad-hoc code is
//! staged as non-persistent: its entries resolve and are readable like any
//! other, but no commit will ever write them to the backing cache.
//!
//! Persisted entries are validated on read through their change detector; a
//! stale entry is treated as absent and evicted, forcing re-resolution.

use std::cell::RefCell;
use std::sync::Arc;

use glint_common::DeclarationId;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::cache::CacheBackend;
use crate::data::{TypedMap, keys};
use crate::error::{CyclePath, ReflectError, Result};
use crate::recursion::RecursionGuard;
use crate::session::Reflector;

/// A deferred resolution; evaluated at most once.
pub type ResolveThunk = Box<dyn FnOnce(&Reflector) -> Result<TypedMap>>;

enum Staged {
    Pending { thunk: ResolveThunk, persist: bool },
    /// The thunk is executing somewhere up the call stack.
    InProgress,
    Resolved { data: TypedMap, persist: bool },
}

/// Transactional, cache-backed store of resolved declaration data.
pub struct DataStorage {
    cache: Arc<dyn CacheBackend>,
    staged: RefCell<IndexMap<DeclarationId, Staged>>,
    guard: RefCell<RecursionGuard<DeclarationId>>,
}

impl DataStorage {
    pub fn new(cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            cache,
            staged: RefCell::new(IndexMap::new()),
            guard: RefCell::new(RecursionGuard::new()),
        }
    }

    /// Stages a not-yet-evaluated resolution for `id`. Non-persistent
    /// entries resolve normally but are invisible to [`commit`].
    /// Staging the same identity twice keeps the first entry.
    ///
    /// [`commit`]: DataStorage::commit
    pub fn stage(&self, id: DeclarationId, thunk: ResolveThunk, persist: bool) {
        let mut staged = self.staged.borrow_mut();
        if staged.contains_key(&id) {
            return;
        }
        trace!(id = %id, persist, "stage");
        staged.insert(id, Staged::Pending { thunk, persist });
    }

    /// Returns resolved data for `id`: a staged result (evaluating the thunk
    /// if needed), or a committed cache entry that is still fresh.
    pub fn get(&self, id: &DeclarationId, session: &Reflector) -> Result<Option<TypedMap>> {
        enum State {
            Resolved(TypedMap),
            Pending(ResolveThunk, bool),
            Absent,
        }

        let state = {
            let mut staged = self.staged.borrow_mut();
            match staged.get_mut(id) {
                Some(Staged::Resolved { data, .. }) => State::Resolved(data.clone()),
                Some(entry @ Staged::Pending { .. }) => {
                    match std::mem::replace(entry, Staged::InProgress) {
                        Staged::Pending { thunk, persist } => State::Pending(thunk, persist),
                        _ => unreachable!("entry kind checked above"),
                    }
                }
                // Re-entry into a thunk that is executing up the call stack.
                Some(Staged::InProgress) => {
                    let mut guard = self.guard.borrow_mut();
                    let path = match guard.enter(id.clone()) {
                        Err(path) => path,
                        Ok(()) => {
                            guard.leave(id);
                            vec![id.clone(), id.clone()]
                        }
                    };
                    return Err(ReflectError::ResolutionCycle(CyclePath(path)));
                }
                None => State::Absent,
            }
        };

        match state {
            State::Resolved(data) => Ok(Some(data)),
            State::Pending(thunk, persist) => {
                self.evaluate(id, thunk, persist, session).map(Some)
            }
            State::Absent => self.read_cache(id),
        }
    }

    fn evaluate(
        &self,
        id: &DeclarationId,
        thunk: ResolveThunk,
        persist: bool,
        session: &Reflector,
    ) -> Result<TypedMap> {
        if let Err(path) = self.guard.borrow_mut().enter(id.clone()) {
            return Err(ReflectError::ResolutionCycle(CyclePath(path)));
        }

        trace!(id = %id, "resolve");
        let result = thunk(session);
        self.guard.borrow_mut().leave(id);

        match result {
            Ok(data) => {
                self.staged.borrow_mut().insert(
                    id.clone(),
                    Staged::Resolved {
                        data: data.clone(),
                        persist,
                    },
                );
                Ok(data)
            }
            Err(error) => {
                // Drop the failed entry so the failure is reported, not a
                // poisoned in-progress marker.
                self.staged.borrow_mut().shift_remove(id);
                Err(error)
            }
        }
    }

    fn read_cache(&self, id: &DeclarationId) -> Result<Option<TypedMap>> {
        let key = id.cache_key();
        let bytes = self
            .cache
            .get(&key)
            .map_err(|error| ReflectError::Configuration(error.to_string()))?;
        let Some(bytes) = bytes else {
            return Ok(None);
        };

        if let Ok(data) = serde_json::from_slice::<TypedMap>(&bytes) {
            let fresh = data
                .get(keys::ChangeDetector)
                .is_some_and(|detector| !detector.changed());
            if fresh {
                trace!(id = %id, "cache hit");
                return Ok(Some(data));
            }
            debug!(id = %id, "cache entry stale, evicting");
        } else {
            debug!(id = %id, "cache entry unreadable, evicting");
        }

        self.cache
            .delete(&key)
            .map_err(|error| ReflectError::Configuration(error.to_string()))?;
        Ok(None)
    }

    /// Evaluates all remaining persistable staged thunks in staging order,
    /// then writes every persistable resolved entry to the cache backend.
    /// Non-persistent entries and entries whose thunk is still executing up
    /// the call stack are left alone.
    pub fn commit(&self, session: &Reflector) -> Result<()> {
        loop {
            let next = self
                .staged
                .borrow()
                .iter()
                .find(|(_, entry)| matches!(entry, Staged::Pending { persist: true, .. }))
                .map(|(id, _)| id.clone());
            match next {
                Some(id) => {
                    self.get(&id, session)?;
                }
                None => break,
            }
        }

        let resolved: Vec<(DeclarationId, TypedMap)> = {
            let mut staged = self.staged.borrow_mut();
            let mut resolved = Vec::new();
            staged.retain(|id, entry| match entry {
                Staged::Resolved {
                    data,
                    persist: true,
                } => {
                    resolved.push((id.clone(), data.clone()));
                    false
                }
                _ => true,
            });
            resolved
        };

        debug!(count = resolved.len(), "commit");
        for (id, data) in resolved {
            let bytes = serde_json::to_vec(&data)
                .map_err(|error| ReflectError::Configuration(error.to_string()))?;
            self.cache
                .set(&id.cache_key(), bytes)
                .map_err(|error| ReflectError::Configuration(error.to_string()))?;
        }
        Ok(())
    }

    /// Discards staged-but-uncommitted work without persisting anything.
    pub fn rollback(&self) {
        debug!("rollback");
        self.staged
            .borrow_mut()
            .retain(|_, entry| matches!(entry, Staged::InProgress));
    }
}
