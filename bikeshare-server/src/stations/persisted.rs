//! Station store that writes through to the data file.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::domain::{NewStation, Station, StationId};

use super::error::StationError;
use super::file::StationFile;
use super::store::{MemoryStationStore, StationStore};

/// In-memory store whose every successful change is saved to disk.
///
/// Saves after pipeline write-backs are best-effort: a failed save is logged
/// and the in-memory state stays authoritative.
#[derive(Debug, Clone)]
pub struct PersistedStationStore {
    memory: MemoryStationStore,
    file: Arc<StationFile>,
    /// Serialises snapshot-and-write so an older snapshot never lands last.
    save_lock: Arc<Mutex<()>>,
}

impl PersistedStationStore {
    /// Load the store from `file`.
    pub fn load(file: StationFile) -> Self {
        let memory = MemoryStationStore::from_stations(file.load());
        Self {
            memory,
            file: Arc::new(file),
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn create(&self, new: NewStation) -> Result<Station, StationError> {
        let station = self.memory.create(new);
        self.save()?;
        Ok(station)
    }

    pub fn delete(&self, id: StationId) -> Result<Station, StationError> {
        let removed = self.memory.delete(id).ok_or(StationError::NotFound(id))?;
        self.save()?;
        Ok(removed)
    }

    pub fn list(&self) -> Vec<Station> {
        self.memory.list()
    }

    /// Replace every station, normalising the incoming records.
    pub fn replace_all(&self, stations: Vec<Station>) -> Result<(), StationError> {
        let stations = stations
            .into_iter()
            .map(|mut s| {
                s.normalize();
                s
            })
            .collect();
        self.memory.replace_all(stations);
        self.save()
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Write the current stations to disk.
    pub fn save(&self) -> Result<(), StationError> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.file.save(&self.memory.list())
    }
}

impl StationStore for PersistedStationStore {
    fn get(&self, id: StationId) -> Option<Station> {
        self.memory.get(id)
    }

    /// Saves only when something that reaches the data file changed; pipeline
    /// claims and releases stay in memory.
    fn modify<R>(&self, id: StationId, f: impl FnOnce(&mut Station) -> R) -> Option<R> {
        let (result, changed) = self.memory.modify(id, |station| {
            let before = station.clone();
            let result = f(station);
            (result, !station.same_persisted(&before))
        })?;

        if changed && let Err(e) = self.save() {
            warn!(station = %id, error = %e, "failed to persist station change");
        }
        Some(result)
    }
}
