//! Cache Entry Module
//!
//! Defines the structure for individual cache entries.

use tokio::time::Instant;

// == Cache Entry ==
/// A cached payload together with the time it was last written.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    /// The stored payload, unparsed
    pub(crate) value: Vec<u8>,
    /// Time of insertion or last overwrite
    pub(crate) created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub(crate) fn new(value: Vec<u8>) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    // == Refresh ==
    /// Replaces the payload and resets the creation time.
    pub(crate) fn refresh(&mut self, value: Vec<u8>) {
        self.value = value;
        self.created_at = Instant::now();
    }

    // == Is Stale ==
    /// Checks whether a sweep running at `now` should reap this entry.
    ///
    /// Uses a strict comparison: an entry written at exactly the sweep
    /// instant survives until the following sweep.
    pub(crate) fn is_stale(&self, now: Instant) -> bool {
        self.created_at < now
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(b"payload".to_vec());

        assert_eq!(entry.value, b"payload");
        assert!(entry.created_at <= Instant::now());
    }

    #[test]
    fn test_stale_before_sweep() {
        let entry = CacheEntry::new(b"payload".to_vec());

        assert!(entry.is_stale(entry.created_at + Duration::from_millis(1)));
    }

    #[test]
    fn test_not_stale_at_sweep_boundary() {
        let entry = CacheEntry::new(b"payload".to_vec());

        // Written at the same instant the sweep runs
        assert!(!entry.is_stale(entry.created_at));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_resets_created_at() {
        let mut entry = CacheEntry::new(b"old".to_vec());
        let first = entry.created_at;

        tokio::time::advance(Duration::from_millis(10)).await;
        entry.refresh(b"new".to_vec());

        assert_eq!(entry.value, b"new");
        assert_eq!(entry.created_at, first + Duration::from_millis(10));
        assert!(!entry.is_stale(first + Duration::from_millis(10)));
    }
}
