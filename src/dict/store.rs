//! Live entry store: key index plus recency list.
//!
//! ```text
//!   index: FxHashMap<K, SlotId>        list: IntrusiveList<Entry<K, V>>
//!
//!     "b" ──► id_0 ─┐
//!     "a" ──► id_2 ─┼──►  head ─► [id_0 "b"] ◄──► [id_2 "a"] ◄──► [id_1 "c"] ◄─ tail
//!     "c" ──► id_1 ─┘             MRU                              LRU
//! ```
//!
//! `Store` is a plain `&mut` structure; it never calls user code other than
//! `K: Hash + Eq + Clone` and never drops a key or value. Everything that
//! leaves it, including the index's own copy of a key and a duplicate key
//! passed to [`upsert`](Store::upsert), is returned by value so the cache can
//! release it outside its critical section.

use std::collections::TryReserveError;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::InvariantError;
use crate::stats::CacheStats;

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// An entry unlinked from the store, together with the key clone the index
/// held for it.
#[derive(Debug)]
pub(crate) struct Detached<K, V> {
    pub key: K,
    pub value: V,
    pub index_key: K,
}

impl<K, V> Detached<K, V> {
    /// Splits off the pair, releasing the index key.
    ///
    /// Only call this outside the cache's critical section.
    pub fn into_pair(self) -> (K, V) {
        drop(self.index_key);
        (self.key, self.value)
    }
}

#[derive(Debug)]
pub(crate) struct Store<K, V> {
    index: FxHashMap<K, SlotId>,
    list: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            list: IntrusiveList::new(),
            capacity,
            stats: CacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Updates the capacity without evicting; the caller drains the
    /// overflow with [`pop_overflow`](Self::pop_overflow).
    pub fn set_capacity(&mut self, capacity: usize) {
        debug_assert!(capacity > 0);
        self.capacity = capacity;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up `key`, promoting it to MRU and counting a hit or miss.
    pub fn lookup(&mut self, key: &K) -> Option<&V> {
        match self.index.get(key).copied() {
            Some(id) => {
                self.stats.record_hit();
                self.list.move_to_front(id);
                self.list.get(id).map(|entry| &entry.value)
            },
            None => {
                self.stats.record_miss();
                None
            },
        }
    }

    /// Promotes `key` to MRU without touching the counters.
    pub fn touch(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Reserves room for inserting `key` if it is not already present, so
    /// that a following [`upsert`](Self::upsert) cannot fail half way.
    pub fn reserve_for(&mut self, key: &K) -> Result<(), TryReserveError> {
        if self.index.contains_key(key) {
            return Ok(());
        }
        self.index.try_reserve(1)?;
        self.list.try_reserve_one()
    }

    /// Inserts at MRU or swaps the value of an existing key in place.
    ///
    /// On replacement returns the incoming key (the stored one is kept) and
    /// the superseded value. Does not evict: the store may sit one entry over
    /// capacity until the caller pops the overflow.
    pub fn upsert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            let entry = self.list.get_mut(id)?;
            let old = std::mem::replace(&mut entry.value, value);
            return Some((key, old));
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    pub fn remove(&mut self, key: &K) -> Option<Detached<K, V>> {
        let id = *self.index.get(key)?;
        self.detach(id)
    }

    /// Detaches the LRU entry if the store holds more than `capacity`.
    pub fn pop_overflow(&mut self) -> Option<Detached<K, V>> {
        if self.len() <= self.capacity {
            return None;
        }
        self.pop_back()
    }

    pub fn pop_front(&mut self) -> Option<Detached<K, V>> {
        let id = self.list.front_id()?;
        self.detach(id)
    }

    pub fn pop_back(&mut self) -> Option<Detached<K, V>> {
        let id = self.list.back_id()?;
        self.detach(id)
    }

    /// Unlinks slot `id` from both the list and the index. The slot is only
    /// removed once its index entry has been found, so a failed lookup leaves
    /// the store as it was.
    fn detach(&mut self, id: SlotId) -> Option<Detached<K, V>> {
        let key = &self.list.get(id)?.key;
        let (index_key, _) = self.index.remove_entry(key)?;
        match self.list.remove(id) {
            Some(entry) => Some(Detached {
                key: entry.key,
                value: entry.value,
                index_key,
            }),
            None => {
                self.index.insert(index_key, id);
                None
            },
        }
    }

    pub fn front(&self) -> Option<(&K, &V)> {
        self.list.front().map(|entry| (&entry.key, &entry.value))
    }

    pub fn back(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    /// Entries from MRU to LRU.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Removes every entry. Returns the pairs MRU first, followed by the
    /// index's key clones in no particular order.
    pub fn take_all(&mut self) -> (Vec<(K, V)>, Vec<K>) {
        let index_keys = self.index.drain().map(|(key, _)| key).collect();
        let pairs = self
            .list
            .take_all()
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect();
        (pairs, index_keys)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        #[cfg(any(test, debug_assertions))]
        self.list
            .validate_links()
            .map_err(|msg| InvariantError::new(format!("recency list: {msg}")))?;

        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            match self.list.get(id) {
                Some(entry) if entry.key == *key => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "slot {} holds a different key than its index entry",
                        id.index()
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "index points at free slot {}",
                        id.index()
                    )));
                },
            }
        }
        if self.list.is_empty() != (self.list.front_id().is_none() && self.list.back_id().is_none())
        {
            return Err(InvariantError::new("head/tail disagree with emptiness"));
        }
        Ok(())
    }
}
