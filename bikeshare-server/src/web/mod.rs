//! Web layer for the bike-share dashboard.
//!
//! Serves the station list, the local reverse-geocode endpoint and the
//! station management API.

mod dto;
mod routes;
mod state;


pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
