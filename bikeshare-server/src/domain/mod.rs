//! Domain types for the bike-share dashboard.
//!
//! Stations, their coordinates and the occupancy figures derived from them.
//! Everything here is plain data; I/O lives in `stations` and `geocoding`.

mod coordinates;
mod occupancy;
mod station;

pub use coordinates::{Coordinates, DEGREE_MARKER, is_coordinate_label};
pub use occupancy::{
    HIGH_THRESHOLD, MEDIUM_THRESHOLD, OccupancyLevel, address_label, free_slots, occupancy_level,
    occupancy_ratio,
};
pub use station::{
    DEFAULT_CAPACITY, NewStation, RequestToken, Station, StationId, StationUpdate,
};
