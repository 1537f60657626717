//! Optional operational counters, enabled with the `metrics` feature.

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::LruDictMetrics;
pub use snapshot::LruDictMetricsSnapshot;
