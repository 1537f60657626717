//! Claim-based FIFO buffer for evicted entries awaiting release.
//!
//! Producers append to the tail. A consumer *claims* the window
//! `[head, tail)` as it stands at that moment, advancing `head` past it, and
//! then takes entries out of its window one slot at a time. Anything appended
//! after the claim lands beyond the window and is left for the next claim.
//!
//! ```text
//!   slots:  [ None | None | Some(e2) | Some(e3) | Some(e4) | Some(e5) ]
//!                           └──── claim #1 ────┘ ▲
//!                                                head (next claim starts here)
//! ```
//!
//! Slot indices stay stable while any claim is outstanding: the processed
//! prefix is only compacted away when the last outstanding claim is released.

use std::collections::TryReserveError;
use std::ops::Range;

/// A window of slot indices handed out by [`StagingQueue::claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    range: Range<usize>,
}

impl Claim {
    pub fn indices(&self) -> Range<usize> {
        self.range.clone()
    }
}

#[derive(Debug)]
pub struct StagingQueue<T> {
    slots: Vec<Option<T>>,
    head: usize,
    pending: usize,
    outstanding: u32,
}

impl<T> StagingQueue<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: 0,
            pending: 0,
            outstanding: 0,
        }
    }

    /// Appends `item` at the tail.
    ///
    /// Storage is reserved fallibly; on failure the item is handed back so
    /// the caller decides where it gets dropped.
    pub fn try_push(&mut self, item: T) -> Result<(), (T, TryReserveError)> {
        if let Err(err) = self.slots.try_reserve(1) {
            return Err((item, err));
        }
        self.slots.push(Some(item));
        self.pending += 1;
        Ok(())
    }

    /// Entries not yet released, claimed or not.
    pub fn len(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Entries appended since the last claim.
    pub fn unclaimed(&self) -> usize {
        self.slots.len() - self.head
    }

    /// Number of claims handed out and not yet released.
    pub fn outstanding_claims(&self) -> u32 {
        self.outstanding
    }

    /// Claims every unclaimed slot. Returns `None` when there is nothing to
    /// claim or the claim counter is saturated.
    pub fn claim(&mut self) -> Option<Claim> {
        if self.unclaimed() == 0 || self.outstanding == u32::MAX {
            return None;
        }
        let range = self.head..self.slots.len();
        self.head = range.end;
        self.outstanding += 1;
        Some(Claim { range })
    }

    /// Takes the entry at `index` out of its slot.
    pub fn take(&mut self, index: usize) -> Option<T> {
        let item = self.slots.get_mut(index)?.take()?;
        self.pending -= 1;
        Some(item)
    }

    /// Returns a claim. The last claim out compacts the claimed prefix.
    ///
    /// Entries the claimant never took (a drain cut short by a panic) are
    /// returned instead of being dropped here, so their destructors run
    /// wherever the caller chooses.
    pub fn release(&mut self, claim: Claim) -> Vec<T> {
        debug_assert!(claim.range.end <= self.head);
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.outstanding > 0 {
            return Vec::new();
        }

        let leftovers: Vec<T> = self.slots.drain(..self.head).flatten().collect();
        self.pending -= leftovers.len();
        self.head = 0;
        leftovers
    }
}

impl<T> Default for StagingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
