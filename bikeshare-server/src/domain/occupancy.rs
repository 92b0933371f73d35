//! Occupancy figures shown next to each station.

use serde::Serialize;

use super::station::Station;

/// Ratio at or above which a station counts as nearly full.
pub const HIGH_THRESHOLD: f64 = 0.85;

/// Ratio at or above which a station counts as filling up.
pub const MEDIUM_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyLevel {
    Low,
    Medium,
    High,
}

/// Bikes over capacity, capped at 1. Zero when capacity is unknown.
pub fn occupancy_ratio(station: &Station) -> f64 {
    if station.capacity == 0 {
        return 0.0;
    }
    (f64::from(station.bikes) / f64::from(station.capacity)).min(1.0)
}

pub fn occupancy_level(station: &Station) -> OccupancyLevel {
    let ratio = occupancy_ratio(station);
    if ratio >= HIGH_THRESHOLD {
        OccupancyLevel::High
    } else if ratio >= MEDIUM_THRESHOLD {
        OccupancyLevel::Medium
    } else {
        OccupancyLevel::Low
    }
}

pub fn free_slots(station: &Station) -> u32 {
    station.capacity.saturating_sub(station.bikes)
}

/// Text to display for a station's location.
pub fn address_label(station: &Station) -> String {
    match (&station.address, &station.center) {
        (Some(address), _) if !address.is_empty() => address.clone(),
        (_, Some(center)) => center.label(),
        _ => "Unknown address".to_string(),
    }
}
