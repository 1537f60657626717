//! Hit/miss counters.

/// Snapshot of the cache's lookup counters.
///
/// Both counters only ever increase (wrapping on overflow) until
/// [`LruDict::clear`](crate::LruDict::clear) resets them.
///
/// # Example
///
/// ```
/// use lrudict::LruDict;
///
/// let cache = LruDict::new(4).unwrap();
/// cache.set("a", 1).unwrap();
/// cache.get(&"a").unwrap();
/// let _ = cache.get(&"b");
///
/// let stats = cache.stats();
/// assert_eq!((stats.hits, stats.misses), (1, 1));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.hits = self.hits.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_miss(&mut self) {
        self.misses = self.misses.wrapping_add(1);
    }

    /// Total lookups counted, wrapping like the counters themselves.
    pub fn lookups(&self) -> u64 {
        self.hits.wrapping_add(self.misses)
    }

    /// Fraction of lookups that hit, or `None` before the first lookup.
    pub fn hit_ratio(&self) -> Option<f64> {
        match self.lookups() {
            0 => None,
            total => Some(self.hits as f64 / total as f64),
        }
    }
}

impl From<CacheStats> for (u64, u64) {
    fn from(stats: CacheStats) -> Self {
        (stats.hits, stats.misses)
    }
}
