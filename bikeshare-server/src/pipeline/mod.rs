//! Address resolution pipeline.
//!
//! Turns station coordinates into human-readable addresses without hammering
//! third-party geocoders:
//! - `guard` keeps at most one request per station queued or in flight
//! - `queue` runs one request at a time, paced from the previous completion
//! - `resolver` ties them to the provider chain and writes results back
//!
//! Geocoding is best-effort enrichment. When every provider fails the station
//! gets a coordinate label instead, and no error reaches the caller.

mod config;
mod guard;
mod queue;
mod resolver;

#[cfg(test)]
mod resolver_tests;

pub use config::{DEFAULT_PACING_MS, DEFAULT_PROVIDER_TIMEOUT_SECS, PipelineConfig};
pub use guard::{ResolutionRequest, claim, should_enqueue};
pub use queue::DispatchQueue;
pub use resolver::ResolutionPipeline;
