//! Caching layer for the local reverse-geocode endpoint.
//!
//! The endpoint forwards to Nominatim, whose usage policy allows roughly one
//! request per second. Lookups are keyed by coordinates rounded to the same
//! four decimals the dashboard displays, so stations placed on the same spot
//! share one upstream request.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::Coordinates;
use crate::geocoding::{GeocodeError, NominatimLookup, Transport};

/// Cache key: coordinates in units of 1e-4 degrees.
type LookupKey = (i64, i64);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Nominatim lookup with caching.
///
/// Only answers Nominatim actually gave are cached (including "no name here");
/// failures always go back upstream next time.
pub struct CachedLookup<T> {
    transport: T,
    lookup: NominatimLookup,
    cache: MokaCache<LookupKey, Option<String>>,
}

impl<T: Transport> CachedLookup<T> {
    /// Create a new cached lookup.
    pub fn new(transport: T, lookup: NominatimLookup, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            transport,
            lookup,
            cache,
        }
    }

    /// Look up the address for `coords`, using the cache if available.
    pub async fn reverse(&self, coords: Coordinates) -> Result<Option<String>, GeocodeError> {
        let key = coords.rounded_key();

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let address = self.lookup.lookup(&self.transport, coords).await?;
        self.cache.insert(key, address.clone()).await;

        Ok(address)
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
