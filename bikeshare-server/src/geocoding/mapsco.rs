//! geocode.maps.co reverse geocoding.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::Coordinates;

use super::provider::{GeocodingProvider, join_parts, non_blank};
use super::transport::ProviderRequest;

pub const DEFAULT_URL: &str = "https://geocode.maps.co/reverse";

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<Address>,
}

/// Address components, declared in the order they are joined.
#[derive(Debug, Deserialize)]
struct Address {
    #[serde(default)]
    road: Option<String>,
    #[serde(default)]
    suburb: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl Address {
    fn join(self) -> Option<String> {
        join_parts([
            self.road,
            self.suburb,
            self.city,
            self.town,
            self.state,
            self.country,
        ])
    }
}

/// Uses `display_name`, else assembles one from the address components.
#[derive(Debug, Clone)]
pub struct MapsCoProvider {
    endpoint: String,
}

impl MapsCoProvider {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_URL.to_string(),
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }
}

impl Default for MapsCoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodingProvider for MapsCoProvider {
    fn name(&self) -> &str {
        "maps.co"
    }

    fn request(&self, coords: Coordinates) -> ProviderRequest {
        ProviderRequest::get(&self.endpoint)
            .param("lat", coords.lat)
            .param("lon", coords.lng)
    }

    fn parse(&self, body: &Value) -> Option<String> {
        let response = Response::deserialize(body).ok()?;
        non_blank(response.display_name).or_else(|| response.address.and_then(Address::join))
    }
}
