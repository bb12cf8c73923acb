//! Pokecache - An in-memory response cache with a background TTL reaper
//!
//! Avoids redundant network fetches by keeping raw response bodies for a
//! fixed lifespan.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheStats};
pub use client::Fetcher;
pub use config::Config;
pub use error::FetchError;
