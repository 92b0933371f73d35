//! The address resolution pipeline: guard, queue, provider chain, write-back.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::domain::{RequestToken, Station, StationId, StationUpdate};
use crate::geocoding::{ProviderChain, Transport};
use crate::stations::StationStore;

use super::config::PipelineConfig;
use super::guard::{ResolutionRequest, claim};
use super::queue::DispatchQueue;

/// Resolves station coordinates to addresses in the background.
///
/// Construct once per process and share by reference (or clone; clones share
/// the same queue). Requests are fire-and-forget: results land in the store.
pub struct ResolutionPipeline<S, T> {
    store: Arc<S>,
    chain: Arc<ProviderChain<T>>,
    queue: DispatchQueue<ResolutionRequest>,
    next_token: Arc<AtomicU64>,
}

impl<S, T> Clone for ResolutionPipeline<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            chain: Arc::clone(&self.chain),
            queue: self.queue.clone(),
            next_token: Arc::clone(&self.next_token),
        }
    }
}

impl<S: StationStore, T: Transport> ResolutionPipeline<S, T> {
    /// Create a pipeline writing results into `store`.
    ///
    /// The config's provider timeout replaces the chain's attempt timeout.
    pub fn new(store: Arc<S>, chain: ProviderChain<T>, config: &PipelineConfig) -> Self {
        let chain = Arc::new(chain.with_attempt_timeout(config.provider_timeout()));

        let queue = {
            let store = Arc::clone(&store);
            let chain = Arc::clone(&chain);
            DispatchQueue::new(config.pacing(), move |request| {
                let store = Arc::clone(&store);
                let chain = Arc::clone(&chain);
                async move { resolve_and_write_back(&*store, &chain, request).await }
            })
        };

        Self {
            store,
            chain,
            queue,
            next_token: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Queue an address lookup for `station` unless the guard refuses it.
    ///
    /// The guard runs against the store's live record, so the in-flight flag
    /// is checked and set atomically. Returns whether a request was queued.
    pub fn request_resolution(&self, station: &Station, force: bool) -> bool {
        if station.center.is_none() {
            return false;
        }

        let token = RequestToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        let Some(request) = self
            .store
            .modify(station.id, |live| claim(live, force, token))
            .flatten()
        else {
            return false;
        };

        debug!(station = %request.station_id, force, "queued address resolution");
        self.queue.push(request);
        true
    }

    /// Requests waiting behind the one in flight.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Wait until every queued request has been written back.
    pub async fn drained(&self) {
        self.queue.drained().await;
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn chain(&self) -> &ProviderChain<T> {
        &self.chain
    }
}

/// Worker body for one request. Always ends with exactly one write-back attempt.
///
/// The result only lands on the record still holding the request's claim.
async fn resolve_and_write_back<S: StationStore, T: Transport>(
    store: &S,
    chain: &ProviderChain<T>,
    request: ResolutionRequest,
) {
    let _release = ClaimRelease {
        store,
        station_id: request.station_id,
        token: request.token,
    };

    let address = match chain.resolve(request.coords).await {
        Some(address) => address,
        None => {
            info!(station = %request.station_id, coords = %request.coords, "no provider named the location, using coordinates");
            request.coords.label()
        }
    };

    let written = store.modify(request.station_id, |live| {
        if !live.is_claimed_by(request.token) {
            return false;
        }
        live.apply(&StationUpdate::resolved(address));
        true
    });

    match written {
        Some(true) => {}
        Some(false) => {
            debug!(station = %request.station_id, "station replaced before its address arrived")
        }
        None => debug!(station = %request.station_id, "station removed before its address arrived"),
    }
}

/// Releases a claim when the worker body ends, including by panic.
///
/// After a normal write-back the claim is already gone and this is a no-op.
struct ClaimRelease<'a, S: StationStore> {
    store: &'a S,
    station_id: StationId,
    token: RequestToken,
}

impl<S: StationStore> Drop for ClaimRelease<'_, S> {
    fn drop(&mut self) {
        let token = self.token;
        if self.store.modify(self.station_id, |live| live.release(token)) == Some(true) {
            debug!(station = %self.station_id, "released claim of an unfinished resolution");
        }
    }
}
