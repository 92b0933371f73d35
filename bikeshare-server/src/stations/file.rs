//! JSON file persistence for stations.

use std::path::{Path, PathBuf};

use crate::domain::Station;

use super::error::StationError;

/// Configuration for the station data file.
#[derive(Debug, Clone)]
pub struct StationFileConfig {
    /// File that is read and written.
    pub path: PathBuf,
    /// Read-only file used when `path` does not exist yet (e.g. bundled seed data).
    pub fallback_path: Option<PathBuf>,
}

impl StationFileConfig {
    /// Create a config for the given data file with no fallback.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback_path: None,
        }
    }

    /// Set a fallback file to seed from.
    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_path = Some(path.into());
        self
    }
}

impl Default for StationFileConfig {
    fn default() -> Self {
        Self::new("stations.json")
    }
}

/// Station data file.
#[derive(Debug, Clone)]
pub struct StationFile {
    config: StationFileConfig,
}

impl StationFile {
    pub fn new(config: StationFileConfig) -> Self {
        Self { config }
    }

    /// Load stations from the data file, else the fallback, else nothing.
    ///
    /// Unreadable or malformed files yield an empty list. Loaded stations are
    /// normalised and their in-flight flags cleared.
    pub fn load(&self) -> Vec<Station> {
        let source = if self.config.path.exists() {
            Some(self.config.path.as_path())
        } else {
            self.config.fallback_path.as_deref().filter(|p| p.exists())
        };

        let Some(source) = source else {
            return Vec::new();
        };

        let Ok(contents) = std::fs::read_to_string(source) else {
            return Vec::new();
        };

        let mut stations: Vec<Station> = match serde_json::from_str(&contents) {
            Ok(stations) => stations,
            Err(e) => {
                tracing::warn!(path = %source.display(), error = %e, "ignoring malformed station file");
                return Vec::new();
            }
        };

        for station in &mut stations {
            station.normalize();
            station.address_requested = false;
        }
        stations
    }

    /// Write stations to the data file.
    ///
    /// Creates parent directories if they don't exist. In-flight flags are not persisted.
    pub fn save(&self, stations: &[Station]) -> Result<(), StationError> {
        let stations: Vec<Station> = stations
            .iter()
            .cloned()
            .map(|mut s| {
                s.address_requested = false;
                s
            })
            .collect();

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StationError::Storage {
                message: format!("failed to create data directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&stations).map_err(|e| StationError::Json {
            message: e.to_string(),
        })?;

        std::fs::write(&self.config.path, json).map_err(|e| StationError::Storage {
            message: format!("failed to write station file: {}", e),
        })?;

        Ok(())
    }

    /// Get the data file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}
