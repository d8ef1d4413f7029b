//! Pass-scoped, single-flight memoization.
//!
//! Every lazy computation in the engine (source indexing, reference
//! resolution) goes through [`SafeCache`], which guarantees that each
//! expensive computation runs at most once per key no matter how many
//! worker threads race on it.
//!
//! Per-key state is an `Arc<OnceLock<..>>` slot stored in a sharded
//! concurrent map. The shard lock is held only long enough to create or
//! fetch the slot; initialization itself happens outside it, so an
//! in-flight computation for one key never blocks lookups or
//! computations for other keys - including keys requested reentrantly
//! from inside another key's compute closure.
//!
//! Failures are cached too: the first computation's error is stored in
//! the slot and replayed to every concurrent and subsequent waiter, never
//! silently retried as a fresh success.
//!
//! Eviction is wholesale: the cache is dropped with the analysis pass.

use crate::error::ModlintError;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

/// A computation failure shared between all waiters on one key.
pub type SharedFailure = Arc<ModlintError>;

type Slot<V> = Arc<OnceLock<Result<V, SharedFailure>>>;

/// Thread-safe single-flight cache keyed by `K`.
///
/// `V` must be cheap to clone; callers typically store `Arc<T>`.
///
/// Requesting the same key from inside its own compute closure would
/// self-deadlock; cache keys must form a DAG, which holds for project
/// graphs because Gradle-style module dependencies are acyclic.
#[derive(Debug)]
pub struct SafeCache<K, V>
where
    K: Eq + Hash,
{
    slots: DashMap<K, Slot<V>>,
}

impl<K, V> Default for SafeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SafeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Return the cached value for `key`, computing it with `compute` if
    /// absent. `compute` is invoked at most once per key even under
    /// concurrent access; all callers observe the same resulting value or
    /// the same failure.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<V, SharedFailure>
    where
        F: FnOnce() -> Result<V, ModlintError>,
    {
        let slot: Slot<V> = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .clone();
        // The shard guard is dropped here; only the slot's own once-lock
        // serializes racers for this key.
        slot.get_or_init(|| compute().map_err(Arc::new)).clone()
    }

    /// Number of keys with a slot (computed or in flight).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Snapshot of all completed, successful values. Used at the end of a
    /// pass to drain accumulated diagnostics out of memoized results.
    pub fn completed_values(&self) -> Vec<V> {
        self.slots
            .iter()
            .filter_map(|entry| match entry.value().get() {
                Some(Ok(value)) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }
}
