//! Builder for [`LruDict`].
//!
//! Collects the optional settings of a cache and validates them together.
//!
//! ## Example
//!
//! ```rust
//! use lrudict::{LruDict, eviction_callback};
//!
//! let cache: LruDict<u64, String> = LruDict::builder(100)
//!     .callback(eviction_callback(|key: &u64, _value: &String| {
//!         log::info!("evicted {key}");
//!         Ok(())
//!     }))
//!     .suspend_auto_purge(false)
//!     .detect_reentrancy(true)
//!     .update_batch_size(64)
//!     .build()
//!     .unwrap();
//! assert_eq!(cache.capacity(), 100);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::callback::EvictionCallback;
use crate::dict::{DEFAULT_UPDATE_BATCH, LruDict};
use crate::error::{LruDictError, Result};

/// Builder for [`LruDict`] instances.
pub struct LruDictBuilder<K, V> {
    capacity: usize,
    callback: Option<EvictionCallback<K, V>>,
    suspend_auto_purge: bool,
    detect_reentrancy: bool,
    update_batch_size: usize,
}

impl<K, V> LruDictBuilder<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            callback: None,
            suspend_auto_purge: false,
            detect_reentrancy: true,
            update_batch_size: DEFAULT_UPDATE_BATCH,
        }
    }

    pub fn callback(mut self, callback: EvictionCallback<K, V>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn suspend_auto_purge(mut self, suspend: bool) -> Self {
        self.suspend_auto_purge = suspend;
        self
    }

    pub fn detect_reentrancy(mut self, detect: bool) -> Self {
        self.detect_reentrancy = detect;
        self
    }

    /// Number of pairs [`LruDict::update`] applies per critical section.
    pub fn update_batch_size(mut self, size: usize) -> Self {
        self.update_batch_size = size;
        self
    }

    /// Validates the settings and builds the cache.
    ///
    /// # Errors
    ///
    /// - [`LruDictError::InvalidCapacity`] if the capacity is zero.
    /// - [`LruDictError::InvalidConfig`] if the update batch size is zero.
    pub fn build(self) -> Result<LruDict<K, V>> {
        if self.capacity == 0 {
            return Err(LruDictError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        if self.update_batch_size == 0 {
            return Err(LruDictError::InvalidConfig(
                "update_batch_size must be positive".to_string(),
            ));
        }
        Ok(LruDict::from_parts(
            self.capacity,
            self.callback,
            self.suspend_auto_purge,
            self.detect_reentrancy,
            self.update_batch_size,
        ))
    }
}

impl<K, V> fmt::Debug for LruDictBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruDictBuilder")
            .field("capacity", &self.capacity)
            .field("has_callback", &self.callback.is_some())
            .field("suspend_auto_purge", &self.suspend_auto_purge)
            .field("detect_reentrancy", &self.detect_reentrancy)
            .field("update_batch_size", &self.update_batch_size)
            .finish()
    }
}
