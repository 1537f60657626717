//! Error types for the lrudict library.
//!
//! ## Key Components
//!
//! - [`LruDictError`]: Returned by [`LruDict`](crate::LruDict) operations.
//!   Validation failures leave the cache untouched.
//! - [`CallbackError`]: Returned by eviction callbacks. Never propagated to
//!   the caller whose operation caused the eviction; the purge engine logs it
//!   and moves on to the next entry.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (debug-only `check_invariants`).
//!
//! ## Example Usage
//!
//! ```
//! use lrudict::{LruDict, LruDictError};
//!
//! let cache: LruDict<&str, i32> = LruDict::new(2).unwrap();
//! assert!(matches!(cache.get(&"missing"), Err(LruDictError::KeyNotFound)));
//! assert!(matches!(
//!     LruDict::<&str, i32>::new(0),
//!     Err(LruDictError::InvalidCapacity { capacity: 0 })
//! ));
//! ```

use std::collections::TryReserveError;

use thiserror::Error;

// ---------------------------------------------------------------------------
// LruDictError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LruDictError {
    /// Capacity must be a positive number of entries.
    #[error("capacity must be positive, got {capacity}")]
    InvalidCapacity { capacity: usize },

    #[error("key not found")]
    KeyNotFound,

    /// `peek_*` or `popitem` on a cache with no entries.
    #[error("cache is empty")]
    EmptyCache,

    /// A guarded operation was entered while another one was still running
    /// on the same cache, typically from an eviction callback or a value's
    /// `Drop`.
    #[error("attempted entry into cache critical section while busy")]
    Reentrancy,

    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Builder option out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LruDictError>;

// ---------------------------------------------------------------------------
// CallbackError
// ---------------------------------------------------------------------------

/// Failure reported by an eviction callback.
///
/// # Example
///
/// ```
/// use lrudict::CallbackError;
///
/// let err = CallbackError::msg("sink closed");
/// assert_eq!(err.to_string(), "eviction callback failed: sink closed");
/// ```
#[derive(Debug, Error)]
#[error("eviction callback failed: {source}")]
pub struct CallbackError {
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl CallbackError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(message.into())
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
