//! Reverse geocoding providers and the fallback chain.
//!
//! Providers are third-party services with incompatible response formats,
//! so each one owns its request shape and parser:
//! - `local`: the dashboard's own `/api/reverse-geocode` endpoint
//! - `nominatim`: OpenStreetMap Nominatim (also used for place search)
//! - `bigdatacloud`: city/region/country from BigDataCloud
//! - `mapsco`: geocode.maps.co, with an address-component fallback

mod bigdatacloud;
mod chain;
mod error;
mod local;
mod mapsco;
mod nominatim;
mod provider;
mod transport;

pub use bigdatacloud::BigDataCloudProvider;
pub use chain::{DEFAULT_ATTEMPT_TIMEOUT, ProviderChain};
pub use error::GeocodeError;
pub use local::{LOCAL_ENDPOINT_PATH, LocalProvider};
pub use mapsco::MapsCoProvider;
pub use nominatim::{NominatimLookup, NominatimProvider, NominatimSearch};
pub use provider::GeocodingProvider;
pub use transport::{
    DEFAULT_USER_AGENT, HttpTransport, HttpTransportConfig, ProviderRequest, Transport,
};
