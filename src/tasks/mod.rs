//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Reaper: sweeps stale cache entries once per lifespan

mod reaper;

pub(crate) use reaper::spawn_reaper;
