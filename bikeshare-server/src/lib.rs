//! Bike-share dashboard server.
//!
//! Serves station data to the dashboard and turns station coordinates into
//! street addresses in the background, one paced request at a time, falling
//! back across several public geocoders.

pub mod cache;
pub mod config;
pub mod domain;
pub mod geocoding;
pub mod pipeline;
pub mod stations;
pub mod web;
