//! # Bounded LRU dictionary with deferred eviction
//!
//! [`LruDict`] keeps at most `capacity` entries in strict recency order and
//! reports every evicted pair to an optional callback. Evicted entries are
//! never released, and the callback never runs, while the cache is in the
//! middle of a mutation.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────────┐
//!   │                          LruDict<K, V>                              │
//!   │                                                                     │
//!   │   guard: ReentrancyGuard            callback: Option<Rc<dyn Fn>>    │
//!   │                                                                     │
//!   │   ┌───────────────────────────────┐     ┌────────────────────────┐  │
//!   │   │ RefCell<Store<K, V>>          │     │ RefCell<StagingQueue>  │  │
//!   │   │  FxHashMap<K, SlotId>         │ LRU │  [(K, V), (K, V), ...] │  │
//!   │   │  IntrusiveList<Entry<K, V>>   ├────►│  FIFO, claim-drained   │  │
//!   │   │  capacity, hits, misses       │     └───────────┬────────────┘  │
//!   │   └───────────────────────────────┘                 │               │
//!   │                                                     ▼               │
//!   │                                   purge: callback(&k, &v), release  │
//!   └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation Flow
//!
//! ```text
//!   set(k, v)
//!     1. enter guard            (Err(Reentrancy) if already busy)
//!     2. upsert into store      (old value kept aside)
//!     3. pop LRU overflow ─► staging queue
//!     4. leave guard
//!     5. auto-purge             (unless suspended)
//!     6. return old value       (caller releases it)
//! ```
//!
//! ## Reentrancy
//!
//! All methods take `&self` so the cache can be shared through `Rc` and
//! reached from eviction callbacks or from values' `Drop` impls. Those paths
//! run outside every `RefCell` borrow. With `detect_reentrancy` on (the
//! default), a guarded operation attempted from inside another one, or from
//! inside an eviction callback, returns [`LruDictError::Reentrancy`].
//!
//! | Method                         | Guarded | May evict | Auto-purge |
//! |--------------------------------|---------|-----------|------------|
//! | `get` / `get_or` / `lookup`    | yes     | no        | no         |
//! | `set` / `setdefault` / `update`| yes     | yes       | yes        |
//! | `set_capacity`                 | yes     | yes       | yes        |
//! | `delete` / `pop` / `popitem`   | yes     | no        | no         |
//! | `clear` / `set_callback`       | yes     | no        | no         |
//! | `contains` / `len` / `peek_*`  | no      | no        | no         |
//! | `keys` / `values` / `items`    | no      | no        | no         |
//!
//! ## Thread Safety
//!
//! `LruDict` is `!Sync`: interior mutability is `Cell`/`RefCell` only.

mod purge;
pub(crate) mod store;
mod update;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;

pub use purge::PurgeState;

use crate::builder::LruDictBuilder;
use crate::callback::EvictionCallback;
use crate::ds::StagingQueue;
use crate::error::{InvariantError, LruDictError, Result};
use crate::guard::{GuardToken, ReentrancyGuard};
#[cfg(feature = "metrics")]
use crate::metrics::LruDictMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruDictMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{EvictionMetricsRecorder, GuardMetricsRecorder, MetricsSnapshotProvider};
use crate::stats::CacheStats;
use store::{Detached, Store};

/// Default number of pairs applied per critical section by [`LruDict::update`].
pub const DEFAULT_UPDATE_BATCH: usize = 128;

/// Bounded LRU dictionary with deferred, reentrancy-safe eviction callbacks.
///
/// # Example
///
/// ```
/// use lrudict::LruDict;
///
/// let cache = LruDict::new(3).unwrap();
/// for key in ["A", "B", "C", "D", "E"] {
///     cache.set(key, key.to_lowercase()).unwrap();
/// }
/// assert_eq!(cache.keys(), vec!["E", "D", "C"]);
/// assert_eq!(cache.get(&"C").unwrap(), "c");
/// assert_eq!(cache.keys(), vec!["C", "E", "D"]);
/// ```
pub struct LruDict<K, V> {
    store: RefCell<Store<K, V>>,
    queue: RefCell<StagingQueue<Detached<K, V>>>,
    guard: ReentrancyGuard,
    callback: RefCell<Option<EvictionCallback<K, V>>>,
    suspend_auto_purge: Cell<bool>,
    update_batch: usize,
    #[cfg(feature = "metrics")]
    metrics: LruDictMetrics,
}

impl<K, V> LruDict<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries, with no callback.
    ///
    /// Fails with [`LruDictError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::builder(capacity).build()
    }

    pub fn builder(capacity: usize) -> LruDictBuilder<K, V> {
        LruDictBuilder::new(capacity)
    }

    pub(crate) fn from_parts(
        capacity: usize,
        callback: Option<EvictionCallback<K, V>>,
        suspend_auto_purge: bool,
        detect_reentrancy: bool,
        update_batch: usize,
    ) -> Self {
        Self {
            store: RefCell::new(Store::new(capacity)),
            queue: RefCell::new(StagingQueue::new()),
            guard: ReentrancyGuard::new(detect_reentrancy),
            callback: RefCell::new(callback),
            suspend_auto_purge: Cell::new(suspend_auto_purge),
            update_batch,
            #[cfg(feature = "metrics")]
            metrics: LruDictMetrics::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Looks up `key`, promoting it to most recently used on a hit.
    ///
    /// Counts a hit or a miss. A miss is `Ok(None)`.
    pub fn lookup(&self, key: &K) -> Result<Option<V>> {
        let _token = self.enter()?;
        let mut store = self.store.borrow_mut();
        Ok(store.lookup(key).cloned())
    }

    /// Returns the value for `key`, or [`LruDictError::KeyNotFound`].
    pub fn get(&self, key: &K) -> Result<V> {
        self.lookup(key)?.ok_or(LruDictError::KeyNotFound)
    }

    /// Returns the value for `key`, or `default` without inserting it.
    ///
    /// ```
    /// use lrudict::LruDict;
    ///
    /// let cache: LruDict<&str, i32> = LruDict::new(2).unwrap();
    /// assert_eq!(cache.get_or(&"missing", 0).unwrap(), 0);
    /// assert!(!cache.contains(&"missing"));
    /// assert_eq!(cache.stats().misses, 1);
    /// ```
    pub fn get_or(&self, key: &K, default: V) -> Result<V> {
        Ok(self.lookup(key)?.unwrap_or(default))
    }

    /// Checks membership without touching recency or counters.
    ///
    /// # Panics
    ///
    /// Panics if called from a key's `Hash`/`Eq` impl or a value's `Clone`
    /// impl while the cache is mutating.
    pub fn contains(&self, key: &K) -> bool {
        self.store.borrow().contains(key)
    }

    /// Returns the most recently used pair without reordering.
    pub fn peek_first(&self) -> Result<(K, V)> {
        let store = self.read_store()?;
        store
            .front()
            .map(|(k, v)| (k.clone(), v.clone()))
            .ok_or(LruDictError::EmptyCache)
    }

    /// Returns the least recently used pair without reordering.
    pub fn peek_last(&self) -> Result<(K, V)> {
        let store = self.read_store()?;
        store
            .back()
            .map(|(k, v)| (k.clone(), v.clone()))
            .ok_or(LruDictError::EmptyCache)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.store.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Values from most to least recently used.
    pub fn values(&self) -> Vec<V> {
        self.store.borrow().iter().map(|(_, v)| v.clone()).collect()
    }

    /// Pairs from most to least recently used.
    pub fn items(&self) -> Vec<(K, V)> {
        self.store
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.store.borrow().stats()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Inserts or replaces `key`, returning the previous value.
    ///
    /// A new key lands at the MRU position; if that takes the cache over
    /// capacity the LRU entry is staged for eviction and reported by the
    /// auto-purge that runs before this method returns. On replacement the
    /// stored key is kept and the passed one is dropped after the critical
    /// section.
    pub fn set(&self, key: K, value: V) -> Result<Option<V>> {
        let replaced = {
            let _token = self.enter()?;
            self.store.borrow_mut().reserve_for(&key)?;
            let replaced = self.store.borrow_mut().upsert(key, value);
            self.evict_overflow();
            replaced
        };
        let replaced = replaced.map(|(_, old)| old);
        self.auto_purge();
        Ok(replaced)
    }

    /// Returns the value for `key`, inserting `default` first if absent.
    ///
    /// An existing key counts as a hit and is promoted; inserting the
    /// default is not counted as a miss.
    pub fn setdefault(&self, key: K, default: V) -> Result<V> {
        let (value, unused) = {
            let _token = self.enter()?;
            let existing = {
                let mut store = self.store.borrow_mut();
                let existing = store.touch(&key).cloned();
                if existing.is_some() {
                    store.stats_mut().record_hit();
                }
                existing
            };
            match existing {
                Some(value) => (value, Some((key, default))),
                None => {
                    self.store.borrow_mut().reserve_for(&key)?;
                    self.store.borrow_mut().upsert(key, default.clone());
                    self.evict_overflow();
                    (default, None)
                },
            }
        };
        drop(unused);
        self.auto_purge();
        Ok(value)
    }

    /// Removes `key`, returning its value or [`LruDictError::KeyNotFound`].
    pub fn delete(&self, key: &K) -> Result<V> {
        let removed = {
            let _token = self.enter()?;
            self.store.borrow_mut().remove(key)
        };
        removed
            .map(|entry| entry.into_pair().1)
            .ok_or(LruDictError::KeyNotFound)
    }

    /// Like [`delete`](Self::delete) but counts a hit or a miss.
    pub fn pop(&self, key: &K) -> Result<V> {
        self.pop_counted(key)?.ok_or(LruDictError::KeyNotFound)
    }

    /// Removes `key` and returns its value, or `default` if it was absent.
    pub fn pop_or(&self, key: &K, default: V) -> Result<V> {
        Ok(self.pop_counted(key)?.unwrap_or(default))
    }

    fn pop_counted(&self, key: &K) -> Result<Option<V>> {
        let removed = {
            let _token = self.enter()?;
            let mut store = self.store.borrow_mut();
            let removed = store.remove(key);
            match removed {
                Some(_) => store.stats_mut().record_hit(),
                None => store.stats_mut().record_miss(),
            }
            removed
        };
        Ok(removed.map(|entry| entry.into_pair().1))
    }

    /// Removes and returns the MRU pair, or the LRU pair if `least_recent`.
    pub fn popitem(&self, least_recent: bool) -> Result<(K, V)> {
        let popped = {
            let _token = self.enter()?;
            let mut store = self.store.borrow_mut();
            if least_recent {
                store.pop_back()
            } else {
                store.pop_front()
            }
        };
        popped
            .map(Detached::into_pair)
            .ok_or(LruDictError::EmptyCache)
    }

    /// Drops every entry and resets hits/misses.
    ///
    /// The callback is not invoked for cleared entries, and entries already
    /// waiting in the staging queue stay there. Cleared entries are released
    /// after the critical section ends.
    pub fn clear(&self) -> Result<()> {
        let (cleared, index_keys) = {
            let _token = self.enter()?;
            let mut store = self.store.borrow_mut();
            *store.stats_mut() = CacheStats::default();
            store.take_all()
        };
        drop(cleared);
        drop(index_keys);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Capacity & configuration
    // -----------------------------------------------------------------------

    pub fn capacity(&self) -> usize {
        self.store.borrow().capacity()
    }

    /// Resizes the cache, evicting LRU entries until it fits.
    ///
    /// ```
    /// use lrudict::LruDict;
    ///
    /// let cache = LruDict::new(4).unwrap();
    /// cache.update((0..4).map(|i| (i, i))).unwrap();
    /// cache.set_capacity(2).unwrap();
    /// assert_eq!(cache.keys(), vec![3, 2]);
    /// assert!(cache.set_capacity(0).is_err());
    /// ```
    pub fn set_capacity(&self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(LruDictError::InvalidCapacity { capacity });
        }
        {
            let _token = self.enter()?;
            let previous = self.store.borrow().capacity();
            self.store.borrow_mut().set_capacity(capacity);
            log::debug!("capacity changed from {previous} to {capacity}");
            self.evict_overflow();
        }
        self.auto_purge();
        Ok(())
    }

    pub fn callback(&self) -> Option<EvictionCallback<K, V>> {
        self.callback.borrow().clone()
    }

    /// Replaces the eviction callback; `None` disables notification.
    ///
    /// A purge already in progress keeps using the callback it started with.
    pub fn set_callback(&self, callback: Option<EvictionCallback<K, V>>) -> Result<()> {
        let previous = {
            let _token = self.enter()?;
            self.callback.replace(callback)
        };
        drop(previous);
        Ok(())
    }

    pub fn suspend_auto_purge(&self) -> bool {
        self.suspend_auto_purge.get()
    }

    /// While set, mutations stage evictions but only [`purge`](Self::purge)
    /// drains them.
    pub fn set_suspend_auto_purge(&self, suspend: bool) {
        self.suspend_auto_purge.set(suspend);
    }

    pub fn detect_reentrancy(&self) -> bool {
        self.guard.detects()
    }

    /// Turning detection off lets nested guarded calls proceed. The cache
    /// stays memory safe either way; with detection off a nested mutation
    /// from an eviction callback is applied immediately.
    pub fn set_detect_reentrancy(&self, detect: bool) {
        self.guard.set_detect(detect);
    }

    /// Evicted entries still waiting in the staging queue. Entries a running
    /// purge has already taken out are not counted.
    pub fn purge_queue_len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Verifies the store invariants: index/list agreement, link symmetry,
    /// and `len <= capacity`.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantError> {
        let store = self
            .store
            .try_borrow()
            .map_err(|_| InvariantError::new("store is mid-mutation"))?;
        store.check_invariants()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn enter(&self) -> Result<GuardToken<'_>> {
        let token = self.guard.enter();
        #[cfg(feature = "metrics")]
        if token.is_err() {
            self.metrics.record_reentrancy_rejected();
        }
        token
    }

    fn read_store(&self) -> Result<std::cell::Ref<'_, Store<K, V>>> {
        self.store.try_borrow().map_err(|_| LruDictError::Reentrancy)
    }

    /// Moves LRU entries past capacity into the staging queue.
    ///
    /// Must run inside the guard. Each entry is detached under its own short
    /// store borrow so nothing user-visible runs while the store is borrowed.
    fn evict_overflow(&self) {
        loop {
            let evicted = self.store.borrow_mut().pop_overflow();
            let Some(entry) = evicted else { break };
            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
            self.stage(entry);
        }
    }

    /// An entry that cannot be staged is dropped inside the guard.
    fn stage(&self, entry: Detached<K, V>) {
        let pushed = self.queue.borrow_mut().try_push(entry);
        match pushed {
            Ok(()) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_staged_entry();
            },
            Err((entry, err)) => {
                log::error!("failed to stage evicted entry, releasing it unreported: {err}");
                #[cfg(feature = "metrics")]
                self.metrics.record_staging_failure();
                drop(entry);
            },
        }
    }
}

impl<K, V> fmt::Debug for LruDict<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("LruDict");
        if let (Ok(store), Ok(queue)) = (self.store.try_borrow(), self.queue.try_borrow()) {
            s.field("len", &store.len())
                .field("capacity", &store.capacity())
                .field("queue_len", &queue.len());
        }
        s.field("has_callback", &self.callback.try_borrow().map(|cb| cb.is_some()).unwrap_or(false))
            .field("guard", &self.guard.state())
            .finish()
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruDictMetricsSnapshot> for LruDict<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn snapshot(&self) -> LruDictMetricsSnapshot {
        LruDictMetricsSnapshot {
            cache_len: self.len(),
            capacity: self.capacity(),
            queue_len: self.purge_queue_len(),
            ..self.metrics.counters()
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruDict<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn metrics_snapshot(&self) -> LruDictMetricsSnapshot {
        self.snapshot()
    }

    pub fn reset_metrics(&self) {
        use crate::metrics::traits::MetricsReset;
        self.metrics.reset_metrics();
    }
}
