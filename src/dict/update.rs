//! Batched bulk insertion.

use std::hash::Hash;

use super::LruDict;
use crate::error::Result;

impl<K, V> LruDict<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Inserts or replaces every pair from `source`, in order.
    ///
    /// Pairs are applied in batches (128 by default, see
    /// [`LruDictBuilder::update_batch_size`](crate::LruDictBuilder::update_batch_size)).
    /// Each batch runs in one critical section; values it supersedes are
    /// released after the section ends. Evictions are reported once, by the
    /// auto-purge that runs after the last batch, including when a batch
    /// fails part way.
    ///
    /// To override some pairs, chain a second iterator: later pairs win.
    ///
    /// ```
    /// use lrudict::LruDict;
    ///
    /// let cache = LruDict::new(3).unwrap();
    /// cache
    ///     .update([("a", 1), ("b", 2)].into_iter().chain([("a", 10)]))
    ///     .unwrap();
    /// assert_eq!(cache.items(), vec![("a", 10), ("b", 2)]);
    /// ```
    pub fn update<I>(&self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let applied = self.apply_batches(source.into_iter());
        self.auto_purge();
        applied
    }

    fn apply_batches(&self, mut source: impl Iterator<Item = (K, V)>) -> Result<()> {
        // Duplicate keys and replaced values, released between batches.
        let mut superseded: Vec<(K, V)> = Vec::new();
        superseded.try_reserve(self.update_batch)?;

        loop {
            let mut exhausted = true;
            let mut rejected = None;
            {
                let _token = self.enter()?;
                for (key, value) in source.by_ref().take(self.update_batch) {
                    exhausted = false;
                    let reserved = self.store.borrow_mut().reserve_for(&key);
                    if let Err(err) = reserved {
                        rejected = Some((err, key, value));
                        break;
                    }
                    let replaced = self.store.borrow_mut().upsert(key, value);
                    if let Some(pair) = replaced {
                        superseded.push(pair);
                    }
                    self.evict_overflow();
                }
            }
            superseded.clear();
            if let Some((err, key, value)) = rejected {
                drop((key, value));
                return Err(err.into());
            }
            if exhausted {
                return Ok(());
            }
        }
    }
}
