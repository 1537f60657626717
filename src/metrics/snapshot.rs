#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruDictMetricsSnapshot {
    pub evicted_entries: u64,
    pub staged_entries: u64,
    pub staging_failures: u64,

    pub purge_calls: u64,
    pub purges_balked: u64,
    pub purged_entries: u64,
    pub callback_invocations: u64,
    pub callback_failures: u64,

    pub reentrancy_rejections: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
    pub queue_len: usize,
}
