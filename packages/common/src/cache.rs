//! Self-clearing memoization cache
//!
//! Entries are evicted in batches: the first insert into an empty window
//! arms a one-shot flush timer, and when it fires every entry collected
//! since the previous flush is dropped together. The next insert arms the
//! timer again.
//!
//! The cache owns its timer thread. The thread only holds a weak reference
//! to the cache state, so dropping the cache never waits for a pending
//! flush.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

struct CacheState<K, V> {
    entries: HashMap<K, V>,
    /// Bumped whenever a window is armed or the cache is cleared manually,
    /// so a stale timer can tell it no longer owns the window.
    generation: u64,
    armed: bool,
}

pub struct SelfClearingCache<K, V> {
    ttl: Duration,
    state: Arc<Mutex<CacheState<K, V>>>,
}

impl<K, V> SelfClearingCache<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                generation: 0,
                armed: false,
            })),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs while the cache lock is held, so concurrent callers
    /// asking for the same key observe a single computation. It must not
    /// call back into the same cache.
    pub fn get_or_cache<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let mut state = self.lock();
        if let Some(value) = state.entries.get(&key) {
            return value.clone();
        }
        let value = compute();
        self.insert_locked(&mut state, key, value.clone());
        value
    }

    /// Fallible variant of [`get_or_cache`](Self::get_or_cache). Errors are
    /// returned to the caller and nothing is cached for the key.
    pub fn get_or_try_cache<F, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut state = self.lock();
        if let Some(value) = state.entries.get(&key) {
            return Ok(value.clone());
        }
        let value = compute()?;
        self.insert_locked(&mut state, key, value.clone());
        Ok(value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Whether a flush is currently scheduled.
    pub fn is_armed(&self) -> bool {
        self.lock().armed
    }

    /// Drop every entry now and disarm any pending flush.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.generation += 1;
        state.armed = false;
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        // A panicking `compute` must not brick the cache for other callers.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert_locked(&self, state: &mut CacheState<K, V>, key: K, value: V) {
        state.entries.insert(key, value);
        if !state.armed {
            state.armed = true;
            state.generation += 1;
            let generation = state.generation;
            self.schedule_flush(state, generation);
        }
    }

    fn schedule_flush(&self, state: &mut CacheState<K, V>, generation: u64) {
        let weak: Weak<Mutex<CacheState<K, V>>> = Arc::downgrade(&self.state);
        let ttl = self.ttl;

        let spawned = thread::Builder::new()
            .name("docweave-cache-flush".to_string())
            .spawn(move || {
                thread::sleep(ttl);
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if state.armed && state.generation == generation {
                    debug!(entries = state.entries.len(), "flushing self-clearing cache");
                    state.entries.clear();
                    state.armed = false;
                }
            });

        if let Err(error) = spawned {
            // Without a timer the window can never close; keep memory bounded
            // by not retaining anything.
            warn!(%error, "failed to spawn cache flush timer");
            state.entries.clear();
            state.armed = false;
        }
    }
}

impl<K, V> Clone for SelfClearingCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            state: Arc::clone(&self.state),
        }
    }
}

impl<K, V> std::fmt::Debug for SelfClearingCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelfClearingCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
