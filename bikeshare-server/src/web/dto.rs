//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    Coordinates, OccupancyLevel, Station, address_label, free_slots, occupancy_level,
    occupancy_ratio,
};

/// Query for the local reverse-geocode endpoint.
///
/// Both fields are optional here so a missing or unparsable value can be
/// answered with the endpoint's own error body instead of a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ReverseGeocodeQuery {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
}

impl ReverseGeocodeQuery {
    /// The requested point, if both coordinates are present and finite.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Coordinates::new(lat, lng))
            }
            _ => None,
        }
    }
}

/// Answer of the local reverse-geocode endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReverseGeocodeResponse {
    /// Display name, or null when the upstream had none
    pub address: Option<String>,
}

/// A station with the figures the dashboard shows next to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationView {
    #[serde(flatten)]
    pub station: Station,

    /// Bikes over capacity, capped at 1
    pub occupancy: f64,

    pub occupancy_level: OccupancyLevel,

    pub free_slots: u32,

    /// Address, or a coordinate label until one is known
    pub label: String,
}

impl StationView {
    pub fn from_station(station: Station) -> Self {
        Self {
            occupancy: occupancy_ratio(&station),
            occupancy_level: occupancy_level(&station),
            free_slots: free_slots(&station),
            label: address_label(&station),
            station,
        }
    }
}

/// Query for forward location search.
#[derive(Debug, Deserialize)]
pub struct SearchLocationQuery {
    #[serde(default)]
    pub q: String,
}

/// Query for a manual resolution request.
#[derive(Debug, Default, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub force: bool,
}

/// Answer to a manual resolution request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// Whether a resolution was queued
    pub queued: bool,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Parse a float query value, treating anything unparsable as absent.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}
