//! Cache Reaper Task
//!
//! Background task that periodically sweeps stale cache entries.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns the reaper for a cache.
///
/// The reaper wakes once per lifespan at a fixed rate, starting one
/// lifespan from now, and removes every entry created before the wake-up.
/// It exits when `closed` carries `true`, when `shutdown` (if given)
/// carries `true`, or when either sender is dropped.
///
/// # Arguments
/// * `shared` - State shared with the cache handles
/// * `closed` - Close signal owned by the cache handles
/// * `shutdown` - Optional external shutdown signal
///
/// # Returns
/// A receiver that flips to `true` once the reaper loop has ended, awaited
/// by `Cache::shutdown`.
pub(crate) fn spawn_reaper(
    shared: Arc<Shared>,
    mut closed: watch::Receiver<bool>,
    mut shutdown: Option<watch::Receiver<bool>>,
) -> watch::Receiver<bool> {
    let lifespan = shared.lifespan();
    let (stopped_tx, stopped_rx) = watch::channel(false);
    let mut ticker = time::interval_at(Instant::now() + lifespan, lifespan);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::spawn(async move {
        info!("Starting cache reaper with interval of {:?}", lifespan);

        loop {
            tokio::select! {
                now = ticker.tick() => {
                    let removed = shared.sweep(now);

                    if removed > 0 {
                        info!("Cache sweep: removed {} stale entries", removed);
                    } else {
                        debug!("Cache sweep: no stale entries found");
                    }
                }
                _ = wait_closed(&mut closed) => break,
                _ = wait_shutdown(shutdown.as_mut()) => break,
            }
        }

        stopped_tx.send_replace(true);
        info!("Cache reaper stopped");
    });

    stopped_rx
}

/// Resolves once the flag is set or its sender is gone.
async fn wait_closed(rx: &mut watch::Receiver<bool>) {
    // Err means the sender was dropped, which also ends the reaper
    let _ = rx.wait_for(|closed| *closed).await;
}

async fn wait_shutdown(rx: Option<&mut watch::Receiver<bool>>) {
    match rx {
        Some(rx) => wait_closed(rx).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use crate::cache::Cache;

    const LIFESPAN: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn test_reaper_removes_stale_entries() {
        let cache = Cache::new(LIFESPAN);

        cache.add("expire_soon", "value");

        // Two full intervals guarantee at least one sweep after the write
        sleep(2 * LIFESPAN + Duration::from_millis(1)).await;

        assert!(
            cache.get("expire_soon").is_none(),
            "Stale entry should have been reaped"
        );
        let stats = cache.stats();
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.reaped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_keeps_entries_until_next_sweep() {
        let cache = Cache::new(LIFESPAN);

        // Let the first sweep run, then write right after it
        sleep(LIFESPAN + Duration::from_millis(1)).await;
        assert_eq!(cache.stats().sweeps, 1);
        cache.add("fresh", "value");

        // Still there just before the second sweep
        sleep(LIFESPAN - Duration::from_millis(2)).await;
        assert_eq!(cache.get("fresh"), Some(b"value".to_vec()));

        // Gone just after it
        sleep(Duration::from_millis(2)).await;
        assert!(cache.get("fresh").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_stops_on_shutdown() {
        let cache = Cache::new(LIFESPAN);

        cache.shutdown().await;
        assert!(cache.is_closed());

        cache.add("kept", "value");
        sleep(10 * LIFESPAN).await;

        assert_eq!(cache.get("kept"), Some(b"value".to_vec()));
        assert_eq!(cache.stats().sweeps, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_stops_on_external_signal() {
        let (tx, rx) = tokio::sync::watch::channel(false);
        let cache = Cache::with_shutdown(LIFESPAN, rx);
        assert!(!cache.is_closed());

        tx.send(true).unwrap();
        sleep(Duration::from_millis(1)).await;

        assert!(cache.is_closed(), "Reaper should exit on external signal");

        cache.add("kept", "value");
        sleep(10 * LIFESPAN).await;
        assert!(cache.get("kept").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_stops_when_signal_sender_dropped() {
        let (tx, rx) = tokio::sync::watch::channel(false);
        let cache = Cache::with_shutdown(LIFESPAN, rx);

        drop(tx);
        sleep(Duration::from_millis(1)).await;

        assert!(cache.is_closed());
    }
}
