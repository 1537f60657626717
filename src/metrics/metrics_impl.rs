use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::LruDictMetricsSnapshot;
use crate::metrics::traits::{
    EvictionMetricsRecorder, GuardMetricsRecorder, MetricsReset, PurgeMetricsRecorder,
};

#[derive(Debug, Default)]
pub struct LruDictMetrics {
    pub evicted_entries: MetricsCell,
    pub staged_entries: MetricsCell,
    pub staging_failures: MetricsCell,
    pub purge_calls: MetricsCell,
    pub purges_balked: MetricsCell,
    pub purged_entries: MetricsCell,
    pub callback_invocations: MetricsCell,
    pub callback_failures: MetricsCell,
    pub reentrancy_rejections: MetricsCell,
}

impl LruDictMetrics {
    /// Copies the counters; gauges are filled in by the cache.
    pub fn counters(&self) -> LruDictMetricsSnapshot {
        LruDictMetricsSnapshot {
            evicted_entries: self.evicted_entries.get(),
            staged_entries: self.staged_entries.get(),
            staging_failures: self.staging_failures.get(),
            purge_calls: self.purge_calls.get(),
            purges_balked: self.purges_balked.get(),
            purged_entries: self.purged_entries.get(),
            callback_invocations: self.callback_invocations.get(),
            callback_failures: self.callback_failures.get(),
            reentrancy_rejections: self.reentrancy_rejections.get(),
            ..LruDictMetricsSnapshot::default()
        }
    }
}

impl EvictionMetricsRecorder for LruDictMetrics {
    fn record_evicted_entry(&self) {
        self.evicted_entries.incr();
    }

    fn record_staged_entry(&self) {
        self.staged_entries.incr();
    }

    fn record_staging_failure(&self) {
        self.staging_failures.incr();
    }
}

impl PurgeMetricsRecorder for LruDictMetrics {
    fn record_purge_call(&self) {
        self.purge_calls.incr();
    }

    fn record_purge_balked(&self) {
        self.purges_balked.incr();
    }

    fn record_purged_entry(&self) {
        self.purged_entries.incr();
    }

    fn record_callback_invocation(&self) {
        self.callback_invocations.incr();
    }

    fn record_callback_failure(&self) {
        self.callback_failures.incr();
    }
}

impl GuardMetricsRecorder for LruDictMetrics {
    fn record_reentrancy_rejected(&self) {
        self.reentrancy_rejections.incr();
    }
}

impl MetricsReset for LruDictMetrics {
    fn reset_metrics(&self) {
        for cell in [
            &self.evicted_entries,
            &self.staged_entries,
            &self.staging_failures,
            &self.purge_calls,
            &self.purges_balked,
            &self.purged_entries,
            &self.callback_invocations,
            &self.callback_failures,
            &self.reentrancy_rejections,
        ] {
            cell.reset();
        }
    }
}
