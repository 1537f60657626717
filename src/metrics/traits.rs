//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and resetting are split into small traits so the
//! cache only depends on the recorder side.
//!
//! ```text
//!   ┌─────────────────────────┐  ┌─────────────────────────┐  ┌──────────────────────┐
//!   │ EvictionMetricsRecorder │  │ PurgeMetricsRecorder    │  │ GuardMetricsRecorder │
//!   │ evicted/staged/failed   │  │ calls/balks/callbacks   │  │ rejected entries     │
//!   └────────────┬────────────┘  └────────────┬────────────┘  └──────────┬───────────┘
//!                └────────────────────────────┼──────────────────────────┘
//!                                             ▼
//!                                    ┌─────────────────┐
//!                                    │  LruDictMetrics │
//!                                    └────────┬────────┘
//!                                             │
//!              ┌──────────────────────────────┴───────────────┐
//!              ▼                                              ▼
//!   ┌──────────────────────────────┐           ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │           │ MetricsReset                 │
//!   └──────────────────────────────┘           └──────────────────────────────┘
//! ```
//!
//! All recorders take `&self`: every cache operation does.

/// Counters for entries leaving the live store.
pub trait EvictionMetricsRecorder {
    fn record_evicted_entry(&self);
    fn record_staged_entry(&self);
    fn record_staging_failure(&self);
}

/// Counters for the purge engine.
pub trait PurgeMetricsRecorder {
    fn record_purge_call(&self);
    fn record_purge_balked(&self);
    fn record_purged_entry(&self);
    fn record_callback_invocation(&self);
    fn record_callback_failure(&self);
}

pub trait GuardMetricsRecorder {
    fn record_reentrancy_rejected(&self);
}

/// Read a point-in-time copy of the counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
