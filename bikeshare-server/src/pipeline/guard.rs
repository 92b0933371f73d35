//! Admission into the resolution pipeline.

use crate::domain::{Coordinates, RequestToken, Station, StationId};

/// A queued resolution: what the worker needs, captured at enqueue time.
///
/// This is a snapshot, not a live reference; the station may be edited or
/// deleted before the worker gets to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRequest {
    pub station_id: StationId,
    pub coords: Coordinates,
    pub force: bool,
    /// The claim this request holds on the station.
    pub token: RequestToken,
}

/// Decide whether a station should be queued for resolution.
///
/// - No coordinates: never.
/// - Already queued or in flight: never, even when forced.
/// - Has a real (non-coordinate) address: only when forced.
pub fn should_enqueue(station: &Station, force: bool) -> bool {
    if station.center.is_none() || station.address_requested {
        return false;
    }
    force || !station.has_resolved_address()
}

/// Check the guard and mark the station in flight in one step.
///
/// Must run against the live record under the store's lock, so that no second
/// caller can pass the guard before the flag lands. `token` must be unique
/// per claim.
pub fn claim(
    station: &mut Station,
    force: bool,
    token: RequestToken,
) -> Option<ResolutionRequest> {
    if !should_enqueue(station, force) {
        return None;
    }
    let coords = station.center?;
    station.claim(token);
    Some(ResolutionRequest {
        station_id: station.id,
        coords,
        force,
        token,
    })
}
