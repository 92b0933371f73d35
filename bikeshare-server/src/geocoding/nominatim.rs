//! OpenStreetMap Nominatim: reverse lookups and place search.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::Coordinates;

use super::error::GeocodeError;
use super::provider::{GeocodingProvider, non_blank};
use super::transport::{ProviderRequest, Transport};

/// Default reverse-geocoding endpoint.
pub const DEFAULT_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Default search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Public Nominatim reverse geocoder used as a fallback provider.
#[derive(Debug, Clone)]
pub struct NominatimProvider {
    endpoint: String,
}

impl NominatimProvider {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_REVERSE_URL.to_string(),
        }
    }

    /// Set a custom endpoint (for testing or a self-hosted instance).
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }
}

impl Default for NominatimProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodingProvider for NominatimProvider {
    fn name(&self) -> &str {
        "nominatim"
    }

    fn request(&self, coords: Coordinates) -> ProviderRequest {
        ProviderRequest::get(&self.endpoint)
            .param("format", "json")
            .param("addressdetails", 1)
            .param("lat", coords.lat)
            .param("lon", coords.lng)
    }

    fn parse(&self, body: &Value) -> Option<String> {
        parse_display_name(body)
    }
}

fn parse_display_name(body: &Value) -> Option<String> {
    let response = ReverseResponse::deserialize(body).ok()?;
    non_blank(response.display_name)
}

/// Detailed reverse lookup behind the dashboard's own `/api/reverse-geocode`.
///
/// Unlike the fallback providers, failures are reported to the caller so the
/// endpoint can answer with a gateway error.
#[derive(Debug, Clone)]
pub struct NominatimLookup {
    endpoint: String,
    language: String,
    email: Option<String>,
}

impl NominatimLookup {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_REVERSE_URL.to_string(),
            language: language.into(),
            email: None,
        }
    }

    /// Set a custom endpoint.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Contact address sent along with each request, as Nominatim's usage policy asks.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn request(&self, coords: Coordinates) -> ProviderRequest {
        let request = ProviderRequest::get(&self.endpoint)
            .param("format", "jsonv2")
            .param("lat", coords.lat)
            .param("lon", coords.lng)
            .param("zoom", 18)
            .param("addressdetails", 1)
            .param("accept-language", &self.language);
        match &self.email {
            Some(email) => request.param("email", email),
            None => request,
        }
    }

    /// Look up the display name. `Ok(None)` means Nominatim answered without one.
    pub async fn lookup<T: Transport>(
        &self,
        transport: &T,
        coords: Coordinates,
    ) -> Result<Option<String>, GeocodeError> {
        let body = transport.get_json(&self.request(coords)).await?;
        Ok(parse_display_name(&body))
    }
}

/// Free-text place search.
#[derive(Debug, Clone)]
pub struct NominatimSearch {
    endpoint: String,
}

impl NominatimSearch {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_URL.to_string(),
        }
    }

    /// Set a custom endpoint.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn request(&self, query: &str) -> ProviderRequest {
        ProviderRequest::get(&self.endpoint)
            .param("format", "json")
            .param("q", query)
    }

    /// Coordinates of the best match for `query`, if any.
    ///
    /// Failures are logged and reported as no match.
    pub async fn search<T: Transport>(&self, transport: &T, query: &str) -> Option<Coordinates> {
        match transport.get_json(&self.request(query)).await {
            Ok(body) => parse_first_hit(&body),
            Err(e) => {
                tracing::warn!(query, error = %e, "location search failed");
                None
            }
        }
    }
}

impl Default for NominatimSearch {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_first_hit(body: &Value) -> Option<Coordinates> {
    let hits = Vec::<SearchHit>::deserialize(body).ok()?;
    let first = hits.into_iter().next()?;
    let lat = first.lat.trim().parse().ok()?;
    let lng = first.lon.trim().parse().ok()?;
    Some(Coordinates::new(lat, lng))
}
