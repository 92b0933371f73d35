//! Geocoding error types.

use std::time::Duration;

/// Errors from a single geocoding request.
///
/// These never escape the provider chain; they are logged and the next
/// provider is tried.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP request failed (network error, client timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the provider
    #[error("rate limited by provider")]
    RateLimited,

    /// Response body was not valid JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Provider did not answer in time
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),
}
