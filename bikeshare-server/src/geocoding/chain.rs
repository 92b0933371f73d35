//! Ordered fallback across geocoding providers.

use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::Coordinates;

use super::bigdatacloud::BigDataCloudProvider;
use super::error::GeocodeError;
use super::local::LocalProvider;
use super::mapsco::MapsCoProvider;
use super::nominatim::NominatimProvider;
use super::provider::GeocodingProvider;
use super::transport::Transport;

/// Default per-attempt timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// A primary provider followed by fallbacks, tried in declared order.
pub struct ProviderChain<T> {
    transport: T,
    primary: Option<Box<dyn GeocodingProvider>>,
    fallbacks: Vec<Box<dyn GeocodingProvider>>,
    attempt_timeout: Duration,
}

impl<T: Transport> ProviderChain<T> {
    /// Create an empty chain. `resolve` on an empty chain always yields `None`.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            primary: None,
            fallbacks: Vec::new(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// The dashboard's standard chain: local endpoint, then Nominatim,
    /// BigDataCloud and maps.co.
    pub fn standard(transport: T, local_base_url: &str, language: &str) -> Self {
        Self::new(transport)
            .with_primary(LocalProvider::new(local_base_url))
            .with_fallback(NominatimProvider::new())
            .with_fallback(BigDataCloudProvider::new(language))
            .with_fallback(MapsCoProvider::new())
    }

    /// Set the provider tried first.
    pub fn with_primary(mut self, provider: impl GeocodingProvider + 'static) -> Self {
        self.primary = Some(Box::new(provider));
        self
    }

    /// Append a fallback provider.
    pub fn with_fallback(mut self, provider: impl GeocodingProvider + 'static) -> Self {
        self.fallbacks.push(Box::new(provider));
        self
    }

    /// Bound each provider attempt, whatever the transport's own timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Provider names in trial order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers().map(|p| p.name()).collect()
    }

    fn providers(&self) -> impl Iterator<Item = &dyn GeocodingProvider> {
        self.primary
            .iter()
            .chain(self.fallbacks.iter())
            .map(|p| &**p)
    }

    /// Resolve coordinates to the first address any provider can name.
    ///
    /// Provider failures are logged and skipped; `None` means every provider
    /// came back empty-handed.
    pub async fn resolve(&self, coords: Coordinates) -> Option<String> {
        for provider in self.providers() {
            match self.attempt(provider, coords).await {
                Ok(Some(address)) => {
                    debug!(provider = provider.name(), %coords, "resolved address");
                    return Some(address);
                }
                Ok(None) => {
                    debug!(provider = provider.name(), %coords, "provider returned no address");
                }
                Err(e) => {
                    warn!(provider = provider.name(), %coords, error = %e, "geocoding provider failed");
                }
            }
        }
        None
    }

    async fn attempt(
        &self,
        provider: &dyn GeocodingProvider,
        coords: Coordinates,
    ) -> Result<Option<String>, GeocodeError> {
        let request = provider.request(coords);
        let body = tokio::time::timeout(self.attempt_timeout, self.transport.get_json(&request))
            .await
            .map_err(|_| GeocodeError::Timeout(self.attempt_timeout))??;
        Ok(provider.parse(&body))
    }
}
