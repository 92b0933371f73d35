//! Station store and persistence.
//!
//! The store is the only state shared between the dashboard handlers and
//! the address resolution pipeline.

mod error;
mod file;
mod persisted;
mod store;

pub use error::StationError;
pub use file::{StationFile, StationFileConfig};
pub use persisted::PersistedStationStore;
pub use store::{MemoryStationStore, StationStore};
