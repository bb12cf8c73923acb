//! Cache Module
//!
//! Provides an in-memory byte cache with creation-time expiry.

mod entry;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use stats::CacheStats;
pub use store::Cache;

pub(crate) use entry::CacheEntry;
pub(crate) use store::Shared;

// == Public Constants ==
/// Smallest lifespan the reaper accepts; shorter values are raised to it.
pub const MIN_LIFESPAN: Duration = Duration::from_millis(1);

/// Largest lifespan the reaper accepts; longer values are lowered to it.
///
/// Roughly 30 years, far enough from `Instant` overflow that scheduling
/// the first sweep cannot fail.
pub const MAX_LIFESPAN: Duration = Duration::from_secs(86_400 * 365 * 30);
