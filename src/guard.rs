//! Reentrancy guard for the cache's critical sections.
//!
//! The cache is single-threaded; the only way two operations can overlap is
//! by nesting on one call stack (an eviction callback, or a value's `Drop`,
//! calling back into the cache). The guard makes that nesting observable:
//! with detection on, a nested [`enter`](ReentrancyGuard::enter) fails
//! instead of running against half-updated state.
//!
//! ```text
//!   Idle ──enter()──► Busy ──token dropped──► Idle
//!                      │
//!                      └─enter() ──► Err(Reentrancy)      (detection on)
//!                      └─enter() ──► Busy (nested token)   (detection off)
//! ```

use std::cell::Cell;

use crate::error::{LruDictError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    Busy,
}

#[derive(Debug)]
pub struct ReentrancyGuard {
    state: Cell<GuardState>,
    detect: Cell<bool>,
}

impl ReentrancyGuard {
    pub fn new(detect: bool) -> Self {
        Self {
            state: Cell::new(GuardState::Idle),
            detect: Cell::new(detect),
        }
    }

    pub fn state(&self) -> GuardState {
        self.state.get()
    }

    pub fn is_busy(&self) -> bool {
        self.state.get() == GuardState::Busy
    }

    pub fn detects(&self) -> bool {
        self.detect.get()
    }

    pub fn set_detect(&self, detect: bool) {
        self.detect.set(detect);
    }

    /// Marks the guard busy until the returned token is dropped.
    ///
    /// Fails with [`LruDictError::Reentrancy`] if the guard is already busy
    /// and detection is on; the state is left as it was.
    pub fn enter(&self) -> Result<GuardToken<'_>> {
        let previous = self.state.get();
        if previous == GuardState::Busy && self.detect.get() {
            log::trace!("rejected reentrant entry into critical section");
            return Err(LruDictError::Reentrancy);
        }
        self.state.set(GuardState::Busy);
        Ok(GuardToken {
            guard: self,
            previous,
        })
    }
}

/// RAII token for a critical section.
///
/// Dropping it restores the state seen on entry, so a nested section admitted
/// with detection off does not mark the outer one idle.
#[must_use = "the critical section ends when the token is dropped"]
#[derive(Debug)]
pub struct GuardToken<'a> {
    guard: &'a ReentrancyGuard,
    previous: GuardState,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.state.set(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_leave() {
        let guard = ReentrancyGuard::new(true);
        assert_eq!(guard.state(), GuardState::Idle);
        {
            let _token = guard.enter().unwrap();
            assert!(guard.is_busy());
        }
        assert_eq!(guard.state(), GuardState::Idle);
    }

    #[test]
    fn nested_entry_rejected_when_detecting() {
        let guard = ReentrancyGuard::new(true);
        let _outer = guard.enter().unwrap();
        assert_eq!(guard.enter().unwrap_err(), LruDictError::Reentrancy);
        assert!(guard.is_busy());
    }

    #[test]
    fn nested_entry_allowed_without_detection() {
        let guard = ReentrancyGuard::new(false);
        let outer = guard.enter().unwrap();
        {
            let _inner = guard.enter().unwrap();
            assert!(guard.is_busy());
        }
        // Inner exit must not end the outer section.
        assert!(guard.is_busy());
        drop(outer);
        assert!(!guard.is_busy());
    }

    #[test]
    fn detection_toggle_takes_effect_immediately() {
        let guard = ReentrancyGuard::new(true);
        let _outer = guard.enter().unwrap();
        guard.set_detect(false);
        assert!(guard.enter().is_ok());
        guard.set_detect(true);
        assert!(guard.detects());
        assert!(guard.enter().is_err());
    }
}
