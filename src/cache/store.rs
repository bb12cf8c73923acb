//! Cache Store Module
//!
//! The TTL cache handle: a single lock around the entry map, shared with a
//! background reaper that sweeps stale entries once per lifespan.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats, MAX_LIFESPAN, MIN_LIFESPAN};
use crate::tasks::spawn_reaper;

// == Shared State ==
/// Everything guarded by the cache lock.
#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, CacheEntry>,
    last_sweep_at: Option<DateTime<Utc>>,
}

/// State shared between every `Cache` handle and the reaper task.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<State>,
    counters: Counters,
    lifespan: Duration,
}

impl Shared {
    fn new(lifespan: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            counters: Counters::default(),
            lifespan,
        }
    }

    pub(crate) fn lifespan(&self) -> Duration {
        self.lifespan
    }

    // == Sweep ==
    /// Removes every entry created strictly before `now`.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn sweep(&self, now: Instant) -> usize {
        let reaped = {
            let mut state = self.state.lock();
            let before = state.entries.len();
            state.entries.retain(|_, entry| !entry.is_stale(now));
            state.last_sweep_at = Some(Utc::now());
            before - state.entries.len()
        };

        self.counters.record_sweep(reaped);
        reaped
    }
}

// == Cache ==
/// Concurrency-safe key/value cache with creation-time expiry.
///
/// Cloning a `Cache` yields another handle to the same entries. Entries
/// are reaped by a background task that wakes once per `lifespan` and
/// removes everything written before the wake-up, so an entry lives
/// between zero and one extra `lifespan` after its last write.
///
/// The reaper stops when [`Cache::close`] is called, when the external
/// shutdown signal given to [`Cache::with_shutdown`] fires, or when the
/// last handle is dropped.
#[derive(Debug, Clone)]
pub struct Cache {
    shared: Arc<Shared>,
    closer: Arc<watch::Sender<bool>>,
    stopped: watch::Receiver<bool>,
}

impl Cache {
    // == Constructor ==
    /// Creates an empty cache and starts its reaper.
    ///
    /// A `lifespan` outside [`MIN_LIFESPAN`]..=[`MAX_LIFESPAN`] is clamped
    /// into that range.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn new(lifespan: Duration) -> Self {
        Self::build(lifespan, None)
    }

    /// Creates an empty cache whose reaper also stops once `shutdown`
    /// carries `true` or its sender is dropped.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn with_shutdown(lifespan: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self::build(lifespan, Some(shutdown))
    }

    fn build(lifespan: Duration, shutdown: Option<watch::Receiver<bool>>) -> Self {
        let lifespan = if lifespan.is_zero() {
            warn!(
                "Cache lifespan of zero is not supported, using {:?}",
                MIN_LIFESPAN
            );
            MIN_LIFESPAN
        } else if lifespan > MAX_LIFESPAN {
            warn!(
                "Cache lifespan of {:?} is too long, using {:?}",
                lifespan, MAX_LIFESPAN
            );
            MAX_LIFESPAN
        } else {
            lifespan
        };

        let shared = Arc::new(Shared::new(lifespan));
        let (closer, closed) = watch::channel(false);
        let stopped = spawn_reaper(Arc::clone(&shared), closed, shutdown);

        Self {
            shared,
            closer: Arc::new(closer),
            stopped,
        }
    }

    // == Add ==
    /// Stores `value` under `key`, overwriting any previous value and
    /// resetting its creation time.
    ///
    /// An empty key is ignored.
    pub fn add(&self, key: &str, value: impl Into<Vec<u8>>) {
        if key.is_empty() {
            return;
        }
        let value = value.into();

        let mut state = self.shared.state.lock();
        match state.entries.get_mut(key) {
            Some(entry) => entry.refresh(value),
            None => {
                state.entries.insert(key.to_owned(), CacheEntry::new(value));
            }
        }
    }

    // == Get ==
    /// Returns a copy of the value stored under `key`.
    ///
    /// Lookups never refresh the entry's creation time. An empty key
    /// misses without taking the lock.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        if key.is_empty() {
            return None;
        }

        let value = self
            .shared
            .state
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.value.clone());

        if value.is_some() {
            self.shared.counters.record_hit();
            debug!("Cache hit for key {}", key);
        } else {
            self.shared.counters.record_miss();
        }
        value
    }

    // == Lifecycle ==
    /// Signals the reaper to stop. Idempotent.
    ///
    /// Entries already stored stay readable and writable; they are simply
    /// no longer reaped.
    pub fn close(&self) {
        self.closer.send_replace(true);
    }

    /// Closes the cache and waits for the reaper task to exit.
    ///
    /// Every caller waits, including concurrent callers on other handles.
    pub async fn shutdown(&self) {
        self.close();

        let mut stopped = self.stopped.clone();
        // Err means the reaper went away without reporting a clean stop
        if stopped.wait_for(|stopped| *stopped).await.is_err() {
            warn!("Cache reaper ended abnormally");
        }
    }

    /// Returns true once close was requested or the reaper has exited.
    pub fn is_closed(&self) -> bool {
        *self.closer.borrow() || self.reaper_stopped()
    }

    fn reaper_stopped(&self) -> bool {
        *self.stopped.borrow() || self.stopped.has_changed().is_err()
    }

    // == Accessors ==
    /// Returns the configured lifespan (also the sweep interval).
    pub fn lifespan(&self) -> Duration {
        self.shared.lifespan
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total_entries, last_sweep_at) = {
            let state = self.shared.state.lock();
            (state.entries.len(), state.last_sweep_at)
        };
        self.shared.counters.snapshot(total_entries, last_sweep_at)
    }

    #[cfg(test)]
    pub(crate) fn sweep_at(&self, now: Instant) -> usize {
        self.shared.sweep(now)
    }

    #[cfg(test)]
    pub(crate) fn created_at(&self, key: &str) -> Option<Instant> {
        self.shared
            .state
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.created_at)
    }
}
