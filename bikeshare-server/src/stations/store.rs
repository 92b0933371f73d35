//! In-memory station store.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::{NewStation, Station, StationId, StationUpdate};

/// Mutable access to station records by id.
///
/// Every call is a single atomic read or write of one station; callers never
/// hold the store across an await point.
pub trait StationStore: Send + Sync + 'static {
    /// Snapshot of a station, if it exists.
    fn get(&self, id: StationId) -> Option<Station>;

    /// Run `f` against the live record under the store's write lock.
    ///
    /// Returns `None` without calling `f` if the station is absent.
    fn modify<R>(&self, id: StationId, f: impl FnOnce(&mut Station) -> R) -> Option<R>;

    /// Apply a partial update. A missing station is a no-op; returns whether it existed.
    fn update(&self, id: StationId, update: &StationUpdate) -> bool {
        self.modify(id, |station| station.apply(update)).is_some()
    }
}

/// Thread-safe station collection, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStationStore {
    inner: Arc<RwLock<BTreeMap<StationId, Station>>>,
}

impl MemoryStationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given stations.
    pub fn from_stations(stations: Vec<Station>) -> Self {
        let store = Self::new();
        store.replace_all(stations);
        store
    }

    /// Add a station, assigning the next free id.
    pub fn create(&self, new: NewStation) -> Station {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next = guard.keys().next_back().map_or(1, |id| id.0 + 1);
        let station = new.into_station(StationId(next));
        guard.insert(station.id, station.clone());
        station
    }

    /// Remove a station, returning it if it existed.
    pub fn delete(&self, id: StationId) -> Option<Station> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// All stations in id order.
    pub fn list(&self) -> Vec<Station> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Replace the whole collection. Later duplicates of an id win.
    ///
    /// In-flight flags belong to the resolution pipeline: a replacement keeps
    /// the flag of the record it replaces, and unknown ids start unflagged.
    pub fn replace_all(&self, stations: Vec<Station>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let map = stations
            .into_iter()
            .map(|mut s| {
                let live = guard.get(&s.id);
                s.address_requested = live.is_some_and(|old| old.address_requested);
                s.request = live.and_then(|old| old.request);
                (s.id, s)
            })
            .collect();
        *guard = map;
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StationStore for MemoryStationStore {
    fn get(&self, id: StationId) -> Option<Station> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    fn modify<R>(&self, id: StationId, f: impl FnOnce(&mut Station) -> R) -> Option<R> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.get_mut(&id).map(f)
    }
}
