use std::cell::Cell;

/// A counter that can be bumped through `&self`.
///
/// The cache is single-threaded and records from `&self` methods (including
/// from inside purge callbacks), so counters are plain `Cell`s. Increments
/// wrap instead of overflowing.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get().wrapping_add(1));
    }

    #[inline]
    pub fn reset(&self) {
        self.0.set(0);
    }
}
