//! Purge engine: drains the staging queue outside every critical section.
//!
//! ```text
//!        stage()               claim()                  release()
//!   Idle ───────► Pending ─────────────► Draining ─────────────────► Idle
//!                   ▲                       │  │                      or
//!                   │   staged while        │  └─ purge() ──► 0       Pending
//!                   └────── draining ───────┘      (balks)
//! ```
//!
//! A purge claims the queue window as it stands on entry and walks it in
//! FIFO order. Each entry is taken out of the queue under a one-statement
//! borrow, handed to the callback inside the reentrancy guard, and released
//! after the guard is left. Entries staged while a purge runs fall beyond the
//! claim and wait for the next purge.

use std::hash::Hash;

use super::LruDict;
use crate::callback::EvictionCallback;
use crate::ds::Claim;
#[cfg(feature = "metrics")]
use crate::metrics::traits::PurgeMetricsRecorder;

/// Observable state of the purge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeState {
    /// Nothing staged.
    Idle,
    /// Evicted entries waiting for a purge.
    Pending,
    /// A purge is walking its claim.
    Draining,
}

/// Returns a claim to the queue when the drain ends, including by unwinding.
///
/// Entries the drain did not reach are dropped after the queue borrow ends.
struct DrainGuard<'a, K, V> {
    dict: &'a LruDict<K, V>,
    claim: Option<Claim>,
}

impl<K, V> Drop for DrainGuard<'_, K, V> {
    fn drop(&mut self) {
        let Some(claim) = self.claim.take() else {
            return;
        };
        // The queue is only ever borrowed for single statements, so it is
        // free here even when unwinding out of a callback.
        let Ok(mut queue) = self.dict.queue.try_borrow_mut() else {
            debug_assert!(false, "staging queue borrowed while releasing a claim");
            return;
        };
        let leftovers = queue.release(claim);
        drop(queue);
        drop(leftovers);
    }
}

impl<K, V> LruDict<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Drains the staging queue now, even if auto-purge is suspended.
    ///
    /// Returns the number of entries released, or 0 if there was nothing to
    /// drain or a purge is already running further up the stack.
    ///
    /// ```
    /// use lrudict::LruDict;
    ///
    /// let cache = LruDict::builder(1).suspend_auto_purge(true).build().unwrap();
    /// cache.set("a", 1).unwrap();
    /// cache.set("b", 2).unwrap();
    /// assert_eq!(cache.purge_queue_len(), 1);
    /// assert_eq!(cache.purge(), 1);
    /// assert_eq!(cache.purge(), 0);
    /// ```
    pub fn purge(&self) -> usize {
        self.purge_with(true)
    }

    pub fn purge_state(&self) -> PurgeState {
        let queue = self.queue.borrow();
        if queue.outstanding_claims() > 0 {
            PurgeState::Draining
        } else if queue.unclaimed() > 0 {
            PurgeState::Pending
        } else {
            PurgeState::Idle
        }
    }

    pub(super) fn auto_purge(&self) {
        self.purge_with(false);
    }

    fn purge_with(&self, force: bool) -> usize {
        #[cfg(feature = "metrics")]
        self.metrics.record_purge_call();

        if self.suspend_auto_purge.get() && !force {
            return 0;
        }

        let claim = {
            let mut queue = self.queue.borrow_mut();
            if self.guard.is_busy() || queue.outstanding_claims() > 0 {
                None
            } else {
                queue.claim()
            }
        };
        let Some(claim) = claim else {
            if self.queue.borrow().unclaimed() > 0 {
                log::trace!("purge balked: cache busy or already draining");
                #[cfg(feature = "metrics")]
                self.metrics.record_purge_balked();
            }
            return 0;
        };

        let indices = claim.indices();
        let claimed = indices.len();
        let callback = self.callback.borrow().clone();
        let _drain = DrainGuard {
            dict: self,
            claim: Some(claim),
        };
        log::debug!("purging {claimed} evicted entries");

        for index in indices {
            let taken = self.queue.borrow_mut().take(index);
            let Some(entry) = taken else { continue };
            #[cfg(feature = "metrics")]
            self.metrics.record_purged_entry();

            if let Some(callback) = &callback {
                self.notify(callback, &entry.key, &entry.value);
            }
            drop(entry);
        }
        claimed
    }

    /// Runs one callback inside the guard. Failures are logged and counted.
    fn notify(&self, callback: &EvictionCallback<K, V>, key: &K, value: &V) {
        let Ok(_token) = self.enter() else {
            return;
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_callback_invocation();
        if let Err(err) = callback(key, value) {
            log::warn!("{err}");
            #[cfg(feature = "metrics")]
            self.metrics.record_callback_failure();
        }
    }
}
