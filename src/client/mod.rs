//! Client Module
//!
//! Read-through HTTP fetching on top of the cache. The request URL is the
//! cache key and the raw response body is the cached value.

mod fetcher;

pub use fetcher::Fetcher;
