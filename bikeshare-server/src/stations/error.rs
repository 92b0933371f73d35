//! Station store error types.

use crate::domain::StationId;

/// Errors that can occur when managing or persisting stations.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// No station with the given id
    #[error("station {0} not found")]
    NotFound(StationId),

    /// Failed to parse or serialize station JSON
    #[error("JSON error: {message}")]
    Json { message: String },

    /// Reading or writing the data file failed
    #[error("storage error: {message}")]
    Storage { message: String },
}
