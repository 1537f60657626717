//! lrudict: a bounded LRU dictionary with deferred, reentrancy-safe eviction
//! callbacks.
//!
//! Entries beyond capacity are evicted least recently used first and staged
//! in a queue. The queue is drained, and the eviction callback invoked, only
//! once the mutation that caused the eviction has left its critical section.
//! Callbacks and value destructors may therefore call back into the cache.
//!
//! ```
//! use lrudict::prelude::*;
//!
//! let cache = LruDict::new(2)?;
//! cache.set("a", 1)?;
//! cache.set("b", 2)?;
//! cache.set("c", 3)?;
//! assert_eq!(cache.keys(), vec!["c", "b"]);
//! # Ok::<(), LruDictError>(())
//! ```

pub mod builder;
pub mod callback;
pub mod dict;
pub mod ds;
pub mod error;
pub mod guard;
pub mod stats;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;

pub use crate::builder::LruDictBuilder;
pub use crate::callback::{EvictionCallback, eviction_callback};
pub use crate::dict::{DEFAULT_UPDATE_BATCH, LruDict, PurgeState};
pub use crate::error::{CallbackError, InvariantError, LruDictError, Result};
pub use crate::guard::GuardState;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruDictMetricsSnapshot;
pub use crate::stats::CacheStats;
