//! Bike-share station records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinates::{Coordinates, is_coordinate_label};

/// Capacity assumed for stations stored without a usable one.
pub const DEFAULT_CAPACITY: u32 = 20;

/// Stable identifier of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u64);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one claim on a station by the resolution pipeline.
///
/// A write-back only lands on the record still holding the token it was
/// claimed with, so a request outliving its station never touches a newer
/// record under the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(pub u64);

/// A station as held by the store and exchanged with the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: StationId,

    /// Position on the map. Stations without one are never geocoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinates>,

    #[serde(default)]
    pub bikes: u32,

    #[serde(default)]
    pub capacity: u32,

    /// Human-readable address, or a coordinate label when geocoding failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Set while a resolution for this station is queued or in flight.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub address_requested: bool,

    /// The claim behind `address_requested`. Never serialized.
    #[serde(skip)]
    pub request: Option<RequestToken>,
}

impl Station {
    /// Create a station with no address.
    pub fn new(id: StationId, center: Coordinates, bikes: u32, capacity: u32) -> Self {
        Self {
            id,
            center: Some(center),
            bikes,
            capacity,
            address: None,
            address_requested: false,
            request: None,
        }
    }

    /// Returns true if the station carries a real address (not a coordinate label).
    pub fn has_resolved_address(&self) -> bool {
        self.address
            .as_deref()
            .is_some_and(|a| !a.is_empty() && !is_coordinate_label(a))
    }

    /// Apply a partial update.
    pub fn apply(&mut self, update: &StationUpdate) {
        if let Some(center) = update.center {
            self.center = Some(center);
        }
        if let Some(bikes) = update.bikes {
            self.bikes = bikes;
        }
        if let Some(capacity) = update.capacity {
            self.capacity = capacity;
        }
        if let Some(address) = &update.address {
            self.address = Some(address.clone());
        }
        if let Some(requested) = update.address_requested {
            self.address_requested = requested;
            if !requested {
                self.request = None;
            }
        }
    }

    /// Mark the station in flight under `token`.
    pub fn claim(&mut self, token: RequestToken) {
        self.address_requested = true;
        self.request = Some(token);
    }

    /// Returns true if `token` is the station's current claim.
    pub fn is_claimed_by(&self, token: RequestToken) -> bool {
        self.request == Some(token)
    }

    /// Drop the claim made with `token`. Returns false if it is not the current one.
    pub fn release(&mut self, token: RequestToken) -> bool {
        if !self.is_claimed_by(token) {
            return false;
        }
        self.address_requested = false;
        self.request = None;
        true
    }

    /// Returns true if both records save to the same JSON.
    pub fn same_persisted(&self, other: &Station) -> bool {
        self.id == other.id
            && self.center == other.center
            && self.bikes == other.bikes
            && self.capacity == other.capacity
            && self.address == other.address
    }

    /// Repair capacity and bike counts loaded from untrusted data.
    pub fn normalize(&mut self) {
        if self.capacity == 0 {
            self.capacity = DEFAULT_CAPACITY;
        }
        if self.bikes > self.capacity {
            self.bikes = self.capacity;
        }
    }
}

/// Fields for a station that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStation {
    pub center: Coordinates,
    #[serde(default)]
    pub bikes: u32,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewStation {
    pub fn into_station(self, id: StationId) -> Station {
        let mut station = Station::new(id, self.center, self.bikes, self.capacity);
        station.address = self.address;
        station.normalize();
        station
    }
}

/// Partial update of a station; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationUpdate {
    pub center: Option<Coordinates>,
    pub bikes: Option<u32>,
    pub capacity: Option<u32>,
    pub address: Option<String>,
    pub address_requested: Option<bool>,
}

impl StationUpdate {
    /// Write-back of a finished resolution.
    pub fn resolved(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            address_requested: Some(false),
            ..Self::default()
        }
    }
}
