//! Configuration Module
//!
//! Handles loading cache and fetcher settings from environment variables.

use std::env;
use std::time::Duration;

/// Default origin for relative resource paths.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/location-area/";

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache entry lifespan and sweep interval in seconds
    pub cache_lifespan: u64,
    /// Timeout for a single origin request in seconds
    pub request_timeout: u64,
    /// Base URL that relative resource paths are joined to
    pub base_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_LIFESPAN_SECS` - Cache lifespan in seconds (default: 5)
    /// - `REQUEST_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
    /// - `BASE_URL` - Origin for relative paths (default: PokeAPI location areas)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_lifespan: env::var("CACHE_LIFESPAN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_lifespan),
            request_timeout: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout),
            base_url: env::var("BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.base_url),
        }
    }

    /// Cache lifespan as a Duration.
    pub fn lifespan(&self) -> Duration {
        Duration::from_secs(self.cache_lifespan)
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Resolves a command argument to a full URL.
    ///
    /// Absolute `http(s)://` URLs are used as-is; anything else is appended
    /// to the base URL.
    pub fn resolve(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, target.trim_start_matches('/'))
        } else {
            format!("{}/{}", self.base_url, target.trim_start_matches('/'))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_lifespan: 5,
            request_timeout: 10,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}
