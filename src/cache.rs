//! Process-lifetime memoization for expensive, read-only resources.
//!
//! The language model, the parsed roster and the font are each loaded at most
//! once per key and then shared as `Arc`s. Every slot is a one-time
//! initialization cell, so concurrent callers for the same key block on a
//! single load instead of racing. A failed load leaves the slot empty and the
//! next request tries again.
//!
//! [`Memo::reset`] drops every cached value; tests use it to start from a
//! clean slate.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// A keyed set of lazily-initialized, shared values.
pub struct Memo<K, V> {
    name: &'static str,
    slots: Mutex<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the value cached under `key`, running `init` if there is none yet.
    ///
    /// The map lock is released before `init` runs; only callers waiting on
    /// the same key are serialized.
    pub fn get_or_try_init<E, F>(&self, key: &K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut loaded = false;
        let value = slot.get_or_try_init(|| {
            loaded = true;
            init().map(Arc::new)
        })?;
        if loaded {
            debug!(memo = self.name, ?key, "Initialized cached resource");
        }
        Ok(Arc::clone(value))
    }

    /// Whether a value is currently cached under `key`.
    pub fn contains(&self, key: &K) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).is_some_and(|slot| slot.get().is_some())
    }

    /// Drop every cached value.
    pub fn reset(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(memo = self.name, entries = slots.len(), "Resetting cached resources");
        slots.clear();
    }
}
