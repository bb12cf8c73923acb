//! Error types for the read-through fetcher
//!
//! The cache itself never fails; only fetching from the origin can.

use reqwest::StatusCode;
use thiserror::Error;

// == Fetch Error Enum ==
/// Errors returned while fetching a resource through the cache.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Empty or otherwise unusable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport failure talking to the origin
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Origin answered 404
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Origin answered with any other non-success status
    #[error("Response from {url} failed with status code {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Payload was not the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "http://origin/a".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("http://origin/a"));
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_decode_error_from_serde() {
        let serde_err = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err: FetchError = serde_err.into();

        assert!(matches!(err, FetchError::Decode(_)));
    }
}
