//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedLookup;
use crate::geocoding::{NominatimSearch, Transport};
use crate::pipeline::ResolutionPipeline;
use crate::stations::PersistedStationStore;

/// Shared application state.
///
/// Generic over the transport so the handlers can be driven by a mock in tests.
pub struct AppState<T> {
    /// Station store, persisted on every change
    pub stations: Arc<PersistedStationStore>,

    /// Background address resolution
    pub pipeline: ResolutionPipeline<PersistedStationStore, T>,

    /// Cached upstream lookup behind `/api/reverse-geocode`
    pub lookup: Arc<CachedLookup<T>>,

    /// Free-text location search
    pub search: Arc<NominatimSearch>,

    /// Transport used for location search
    pub transport: Arc<T>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            stations: Arc::clone(&self.stations),
            pipeline: self.pipeline.clone(),
            lookup: Arc::clone(&self.lookup),
            search: Arc::clone(&self.search),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> AppState<T> {
    /// Create a new app state. The pipeline must write into `stations`.
    pub fn new(
        pipeline: ResolutionPipeline<PersistedStationStore, T>,
        lookup: CachedLookup<T>,
        search: NominatimSearch,
        transport: T,
    ) -> Self {
        Self {
            stations: Arc::clone(pipeline.store()),
            pipeline,
            lookup: Arc::new(lookup),
            search: Arc::new(search),
            transport: Arc::new(transport),
        }
    }
}
