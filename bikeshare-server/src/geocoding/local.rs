//! The dashboard's own reverse-geocode endpoint, tried before any public service.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::Coordinates;

use super::provider::{GeocodingProvider, non_blank};
use super::transport::ProviderRequest;

/// Path of the local endpoint, relative to the server base URL.
pub const LOCAL_ENDPOINT_PATH: &str = "/api/reverse-geocode";

#[derive(Debug, Deserialize)]
struct LocalResponse {
    #[serde(default)]
    address: Option<String>,
}

/// Primary provider backed by `GET /api/reverse-geocode?lat=..&lng=..`.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    endpoint: String,
}

impl LocalProvider {
    /// Create a provider for the server at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}{LOCAL_ENDPOINT_PATH}", base_url.trim_end_matches('/')),
        }
    }
}

impl GeocodingProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn request(&self, coords: Coordinates) -> ProviderRequest {
        ProviderRequest::get(&self.endpoint)
            .param("lat", coords.lat)
            .param("lng", coords.lng)
    }

    fn parse(&self, body: &Value) -> Option<String> {
        let response = LocalResponse::deserialize(body).ok()?;
        non_blank(response.address)
    }
}
