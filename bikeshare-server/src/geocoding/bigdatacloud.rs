//! BigDataCloud client-side reverse geocoding.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::Coordinates;

use super::provider::{GeocodingProvider, join_parts, non_blank};
use super::transport::ProviderRequest;

pub const DEFAULT_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    principal_subdivision: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
}

/// Builds "city, region, country" from BigDataCloud's locality fields.
#[derive(Debug, Clone)]
pub struct BigDataCloudProvider {
    endpoint: String,
    language: String,
}

impl BigDataCloudProvider {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_URL.to_string(),
            language: language.into(),
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }
}

impl GeocodingProvider for BigDataCloudProvider {
    fn name(&self) -> &str {
        "bigdatacloud"
    }

    fn request(&self, coords: Coordinates) -> ProviderRequest {
        ProviderRequest::get(&self.endpoint)
            .param("latitude", coords.lat)
            .param("longitude", coords.lng)
            .param("localityLanguage", &self.language)
    }

    fn parse(&self, body: &Value) -> Option<String> {
        let response = Response::deserialize(body).ok()?;
        // City wins over locality only when it is actually filled in
        let place = non_blank(response.city).or_else(|| non_blank(response.locality));
        join_parts([
            place,
            response.principal_subdivision,
            response.country_name,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> BigDataCloudProvider {
        BigDataCloudProvider::new("sk")
    }

    #[test]
    fn request_shape() {
        let request = provider().request(Coordinates::new(48.1486, 17.1077));
        assert_eq!(request.url, DEFAULT_URL);
        assert_eq!(request.query_value("latitude"), Some("48.1486"));
        assert_eq!(request.query_value("longitude"), Some("17.1077"));
        assert_eq!(request.query_value("localityLanguage"), Some("sk"));
    }

    #[test]
    fn joins_components() {
        let body = json!({
            "city": "Bratislava",
            "locality": "Staré Mesto",
            "principalSubdivision": "Bratislavský kraj",
            "countryName": "Slovensko"
        });
        assert_eq!(
            provider().parse(&body).as_deref(),
            Some("Bratislava, Bratislavský kraj, Slovensko")
        );
    }

    #[test]
    fn empty_city_uses_locality() {
        let body = json!({"city": "", "locality": "Devín", "countryName": "Slovensko"});
        assert_eq!(provider().parse(&body).as_deref(), Some("Devín, Slovensko"));
    }

    #[test]
    fn nothing_present_is_none() {
        let body = json!({"city": "", "principalSubdivision": "", "plusCode": "8FWR4C"});
        assert_eq!(provider().parse(&body), None);
    }
}
