//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, sweeps and reaped entries.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of lookups that found a value
    pub hits: u64,
    /// Number of lookups that found nothing (never inserted or reaped)
    pub misses: u64,
    /// Number of reaper sweeps completed
    pub sweeps: u64,
    /// Number of entries removed by the reaper
    pub reaped: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Wall-clock time of the most recent sweep
    pub last_sweep_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Counters ==
/// Lock-free counters shared between callers and the reaper.
///
/// Kept outside the entry lock so that recording a hit never touches
/// cached state.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    sweeps: AtomicU64,
    reaped: AtomicU64,
}

impl Counters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sweep(&self, reaped: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.reaped.fetch_add(reaped as u64, Ordering::Relaxed);
    }

    /// Builds a snapshot from the current counter values.
    pub(crate) fn snapshot(
        &self,
        total_entries: usize,
        last_sweep_at: Option<DateTime<Utc>>,
    ) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            reaped: self.reaped.load(Ordering::Relaxed),
            total_entries,
            last_sweep_at,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.sweeps, 0);
        assert_eq!(stats.reaped, 0);
        assert_eq!(stats.total_entries, 0);
        assert!(stats.last_sweep_at.is_none());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = Counters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();

        let stats = counters.snapshot(0, None);
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_sweep() {
        let counters = Counters::default();
        counters.record_sweep(3);
        counters.record_sweep(0);

        let stats = counters.snapshot(7, None);
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.reaped, 3);
        assert_eq!(stats.total_entries, 7);
    }

    #[test]
    fn test_stats_serialize() {
        let counters = Counters::default();
        counters.record_hit();

        let json = serde_json::to_string(&counters.snapshot(1, Some(Utc::now()))).unwrap();
        assert!(json.contains("\"hits\":1"));
        assert!(json.contains("last_sweep_at"));
    }
}
