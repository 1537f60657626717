pub use crate::builder::LruDictBuilder;
pub use crate::callback::{EvictionCallback, eviction_callback};
pub use crate::dict::{LruDict, PurgeState};
pub use crate::error::{CallbackError, LruDictError};
pub use crate::stats::CacheStats;

#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
