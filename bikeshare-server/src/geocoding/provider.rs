//! The geocoding provider seam.

use serde_json::Value;

use crate::domain::Coordinates;

use super::transport::ProviderRequest;

/// One reverse-geocoding service.
///
/// Each provider owns its request shape and response schema; the chain only
/// knows how to send the request and hand back the body.
pub trait GeocodingProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Build the request for the given coordinates.
    fn request(&self, coords: Coordinates) -> ProviderRequest;

    /// Extract an address from the response body, if it holds one.
    fn parse(&self, body: &Value) -> Option<String>;
}

/// Keep a string only if it has visible content.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Join the present parts with ", ", or `None` if nothing is left.
pub(crate) fn join_parts(parts: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    let parts: Vec<String> = parts.into_iter().filter_map(non_blank).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
