//! Loader activity counters.
//!
//! Plain `u64` counters, snapshotted by value. The loader is single-threaded
//! by contract, so there is nothing to synchronize.

/// Snapshot of one loader's activity.
///
/// # Example
///
/// ```
/// use loadkit::stats::LoaderStats;
///
/// let stats = LoaderStats::default();
/// assert_eq!(stats.batches, 0);
/// assert_eq!(stats.hits, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Reads answered from the cache.
    pub hits: u64,
    /// Reads answered with "never resolved".
    pub misses: u64,
    /// Batch source invocations.
    pub batches: u64,
    /// Keys handed to the batch source, summed over all invocations.
    pub keys_dispatched: u64,
    /// Entities absorbed from batch results.
    pub entities_loaded: u64,
    /// Entities written through `prime`.
    pub primes: u64,
}

impl LoaderStats {
    /// Fraction of reads answered from the cache, or `None` before any read.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        if total == 0 {
            None
        } else {
            Some(self.hits as f64 / total as f64)
        }
    }
}
